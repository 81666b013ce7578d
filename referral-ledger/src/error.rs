//! Error types for the referral ledger

use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Address failed the format predicate
    #[error("Invalid address: {0:?}")]
    InvalidAddress(String),

    /// Access token or secret did not match
    #[error("Unauthorized")]
    Unauthorized,

    /// Referee is already attached to an active referral
    #[error("Wallet {0} was already referred by another wallet")]
    DuplicateReferee(String),

    /// Referrer reached the active referral cap
    #[error("Referrer {referrer} reached the referral limit of {cap}")]
    CapExceeded {
        /// Referrer that hit the cap
        referrer: String,
        /// Configured cap
        cap: usize,
    },

    /// Durable load or save failed
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for errors raised by input validation, before any mutation
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidAddress(_)
                | Error::Unauthorized
                | Error::DuplicateReferee(_)
                | Error::CapExceeded { .. }
        )
    }
}
