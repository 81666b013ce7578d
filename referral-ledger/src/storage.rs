//! Durable storage for the ledger document
//!
//! The ledger is persisted as a single JSON document:
//!
//! ```json
//! { "referrals": [ ... ], "paid_referrals": [ ... ] }
//! ```
//!
//! Writes go to a sibling temporary file that is flushed to disk and then
//! renamed over the target, so readers never see a torn document and a
//! crash leaves either the old or the new contents.

use crate::{
    error::{Error, Result},
    types::LedgerState,
};
use parking_lot::Mutex;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

/// Load/save contract the ledger depends on
pub trait Persistence: Send + Sync {
    /// Read the full ledger state
    fn load(&self) -> Result<LedgerState>;

    /// Durably replace the stored state
    fn save(&self, state: &LedgerState) -> Result<()>;
}

/// JSON file on the local filesystem
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Storage backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the document
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

/// Flush the directory entry so the rename itself survives a crash
#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

impl Persistence for JsonFileStorage {
    fn load(&self) -> Result<LedgerState> {
        if !self.path.exists() {
            let empty = LedgerState::default();
            self.save(&empty)?;
            tracing::info!(path = %self.path.display(), "Created empty ledger document");
            return Ok(empty);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            Error::Persistence(format!("read {}: {}", self.path.display(), e))
        })?;
        let state: LedgerState = serde_json::from_str(&content).map_err(|e| {
            Error::Persistence(format!("parse {}: {}", self.path.display(), e))
        })?;

        tracing::debug!(
            path = %self.path.display(),
            active = state.active.len(),
            archived = state.archived.len(),
            "Ledger loaded"
        );

        Ok(state)
    }

    fn save(&self, state: &LedgerState) -> Result<()> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir)
            .map_err(|e| Error::Persistence(format!("create {}: {}", dir.display(), e)))?;

        let body = serde_json::to_vec_pretty(state)
            .map_err(|e| Error::Persistence(format!("encode ledger: {}", e)))?;

        let mut temp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| Error::Persistence(format!("temp file in {}: {}", dir.display(), e)))?;
        temp.write_all(&body)
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| Error::Persistence(format!("write {}: {}", temp.path().display(), e)))?;
        temp.persist(&self.path).map_err(|e| {
            Error::Persistence(format!("rename into {}: {}", self.path.display(), e.error))
        })?;
        sync_dir(dir)
            .map_err(|e| Error::Persistence(format!("sync {}: {}", dir.display(), e)))?;

        tracing::debug!(
            path = %self.path.display(),
            bytes = body.len(),
            "Ledger saved"
        );

        Ok(())
    }
}

/// In-process storage; contents vanish with the process
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<LedgerState>,
}

impl MemoryStorage {
    /// Empty storage
    pub fn new() -> Self {
        Self::default()
    }
}

impl Persistence for MemoryStorage {
    fn load(&self) -> Result<LedgerState> {
        Ok(self.state.lock().clone())
    }

    fn save(&self, state: &LedgerState) -> Result<()> {
        *self.state.lock() = state.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{types::ReferralRecord, Address};

    fn addr(c: char) -> Address {
        Address::parse(&format!("0x{}", c.to_string().repeat(40))).unwrap()
    }

    #[test]
    fn test_missing_file_is_created_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("referrals.json");
        let storage = JsonFileStorage::new(&path);

        let state = storage.load().unwrap();
        assert_eq!(state, LedgerState::default());
        assert!(path.exists());

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({"referrals": [], "paid_referrals": []}));
    }

    #[test]
    fn test_save_then_load_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nested/referrals.json"));

        let mut archived = ReferralRecord::referral(addr('c'), addr('d'));
        archived.paid = true;
        let state = LedgerState {
            active: vec![
                ReferralRecord::registration(addr('a')),
                ReferralRecord::referral(addr('a'), addr('b')),
                ReferralRecord::referral(addr('e'), addr('f')),
            ],
            archived: vec![archived],
        };

        storage.save(&state).unwrap();
        assert_eq!(storage.load().unwrap(), state);
    }

    #[test]
    fn test_save_replaces_document_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("referrals.json"));

        storage.load().unwrap();
        let state = LedgerState {
            active: vec![ReferralRecord::registration(addr('a'))],
            archived: vec![],
        };
        storage.save(&state).unwrap();
        storage.save(&state).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("referrals.json")]);
        assert_eq!(storage.load().unwrap(), state);
    }

    #[test]
    fn test_save_into_unwritable_location_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let storage = JsonFileStorage::new(blocker.join("referrals.json"));
        let err = storage.save(&LedgerState::default()).unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
    }

    #[test]
    fn test_hand_edited_document_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("referrals.json");
        std::fs::write(
            &path,
            r#"{"referrals": [{"referrer": "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA", "referee": "0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB"}]}"#,
        )
        .unwrap();

        let state = JsonFileStorage::new(&path).load().unwrap();
        assert_eq!(state.active, vec![ReferralRecord::referral(addr('a'), addr('b'))]);
        assert!(state.archived.is_empty());

        std::fs::write(&path, r#"{"referrals": [{"referrer": "bogus"}]}"#).unwrap();
        let err = JsonFileStorage::new(&path).load().unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
    }

    #[test]
    fn test_corrupt_document_is_persistence_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("referrals.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStorage::new(&path).load().unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
    }

    #[test]
    fn test_reads_legacy_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("referrals.json");
        std::fs::write(
            &path,
            r#"{
  "referrals": [
    {"referrer": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "referee": "", "paid": false}
  ],
  "paid_referrals": []
}"#,
        )
        .unwrap();

        let state = JsonFileStorage::new(&path).load().unwrap();
        assert_eq!(state.active, vec![ReferralRecord::registration(addr('a'))]);
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        let state = LedgerState {
            active: vec![ReferralRecord::registration(addr('a'))],
            archived: vec![],
        };
        storage.save(&state).unwrap();
        assert_eq!(storage.load().unwrap(), state);
    }
}
