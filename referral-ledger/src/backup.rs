//! Timestamped snapshot export

use crate::{
    error::{Error, Result},
    ledger::ReferralLedger,
};
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// File name for a snapshot taken at `at`
pub fn backup_file_name<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("referrals_backup_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Write the current ledger to `backup_dir`
///
/// Takes a consistent snapshot under the read lock; the ledger is never
/// modified.
pub fn export_snapshot<Tz>(
    ledger: &ReferralLedger,
    backup_dir: &Path,
    at: &DateTime<Tz>,
) -> Result<PathBuf>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    std::fs::create_dir_all(backup_dir).map_err(|e| {
        Error::Persistence(format!("create {}: {}", backup_dir.display(), e))
    })?;

    let snapshot = ledger.snapshot();
    let body = serde_json::to_vec_pretty(&snapshot)
        .map_err(|e| Error::Persistence(format!("encode snapshot: {}", e)))?;

    let path = backup_dir.join(backup_file_name(at));
    std::fs::write(&path, body)
        .map_err(|e| Error::Persistence(format!("write {}: {}", path.display(), e)))?;

    tracing::info!(
        path = %path.display(),
        active = snapshot.active.len(),
        archived = snapshot.archived.len(),
        "Backup written"
    );

    Ok(path)
}
