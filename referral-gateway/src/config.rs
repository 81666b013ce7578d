use config::{ConfigError, Environment};
use referral_ledger::LedgerConfig;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
    pub backup: BackupConfig,
    pub ledger: LedgerConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Static secrets; there are no defaults, both must be supplied.
#[derive(Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    pub secret_key: String,
    pub faucet_token: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &"<redacted>")
            .field("faucet_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RateLimitConfig {
    pub use_referral_per_minute: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackupConfig {
    pub enabled: bool,
    /// Six-field cron expression (seconds first), evaluated in UTC
    pub schedule: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // REFERRAL_* variables seed the ledger section
        let defaults =
            LedgerConfig::from_env().map_err(|e| ConfigError::Message(e.to_string()))?;

        let mut builder = config::Config::builder()
            // Server defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            // Rate limiting
            .set_default("rate_limit.use_referral_per_minute", 3)?
            // Backups: daily at midnight
            .set_default("backup.enabled", true)?
            .set_default("backup.schedule", "0 0 0 * * *")?
            // Ledger
            .set_default("ledger.data_file", defaults.data_file.to_string_lossy().to_string())?
            .set_default("ledger.backup_dir", defaults.backup_dir.to_string_lossy().to_string())?
            .set_default("ledger.referral_cap", defaults.referral_cap as i64)?
            .set_default("ledger.reward_per_head", defaults.reward_per_head as i64)?;

        builder = builder.add_source(Environment::with_prefix("REFERRAL_GATEWAY").separator("__"));

        // Override from environment variables
        if let Ok(port) = env::var("PORT") {
            builder = builder.set_override("server.port", port)?;
        }

        if let Ok(secret) = env::var("SECRET_KEY") {
            builder = builder.set_override("auth.secret_key", secret)?;
        }

        if let Ok(token) = env::var("FAUCET_TOKEN") {
            builder = builder.set_override("auth.faucet_token", token)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
