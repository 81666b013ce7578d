//! Configuration for the referral ledger

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// JSON document holding the ledger
    pub data_file: PathBuf,

    /// Directory receiving timestamped snapshots
    pub backup_dir: PathBuf,

    /// Maximum active records per referrer
    pub referral_cap: usize,

    /// Reward per wallet in a payout entry
    pub reward_per_head: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("referrals.json"),
            backup_dir: PathBuf::from("backups"),
            referral_cap: 200,
            reward_per_head: 5,
        }
    }
}

impl LedgerConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: LedgerConfig = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = LedgerConfig::default();

        if let Ok(data_file) = std::env::var("REFERRAL_DATA_FILE") {
            config.data_file = PathBuf::from(data_file);
        }

        if let Ok(backup_dir) = std::env::var("REFERRAL_BACKUP_DIR") {
            config.backup_dir = PathBuf::from(backup_dir);
        }

        if let Ok(cap) = std::env::var("REFERRAL_CAP") {
            config.referral_cap = cap
                .parse()
                .map_err(|e| crate::Error::Config(format!("REFERRAL_CAP: {}", e)))?;
        }

        if let Ok(reward) = std::env::var("REFERRAL_REWARD_PER_HEAD") {
            config.reward_per_head = reward
                .parse()
                .map_err(|e| crate::Error::Config(format!("REFERRAL_REWARD_PER_HEAD: {}", e)))?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::default();
        assert_eq!(config.referral_cap, 200);
        assert_eq!(config.reward_per_head, 5);
        assert_eq!(config.data_file, PathBuf::from("referrals.json"));
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "referral_cap = 10\ndata_file = \"/tmp/ledger.json\"").unwrap();

        let config = LedgerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.referral_cap, 10);
        assert_eq!(config.data_file, PathBuf::from("/tmp/ledger.json"));
        assert_eq!(config.reward_per_head, 5);
    }

    #[test]
    fn test_from_file_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "referral_cap = \"lots\"").unwrap();

        let err = LedgerConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("REFERRAL_BACKUP_DIR", "/var/backups/referrals");
        std::env::set_var("REFERRAL_REWARD_PER_HEAD", "9");

        let config = LedgerConfig::from_env().unwrap();
        assert_eq!(config.backup_dir, PathBuf::from("/var/backups/referrals"));
        assert_eq!(config.reward_per_head, 9);
        assert_eq!(config.referral_cap, 200);

        std::env::set_var("REFERRAL_REWARD_PER_HEAD", "-1");
        assert!(matches!(
            LedgerConfig::from_env().unwrap_err(),
            crate::Error::Config(_)
        ));

        std::env::remove_var("REFERRAL_BACKUP_DIR");
        std::env::remove_var("REFERRAL_REWARD_PER_HEAD");
    }
}
