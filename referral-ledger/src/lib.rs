//! Referral Ledger Core
//!
//! Tracks a wallet referral program: referrers register, referees are
//! attached to them, and an operator periodically settles every outstanding
//! referral into the paid archive.
//!
//! # Architecture
//!
//! - **Single Store**: One [`ReferralLedger`] owns all state; handlers share it by `Arc`
//! - **Copy-on-Write Commits**: Mutations are persisted before they become visible
//! - **Pluggable Persistence**: [`storage::Persistence`] abstracts the durable document
//! - **Read-Only Queries**: Status and payout views never mutate the ledger
//!
//! # Invariants
//!
//! - A referee appears in at most one active record
//! - A referrer never holds more than `referral_cap` active records
//! - Active records are unpaid; archived records are paid and never come back
//! - Active and archived sets are disjoint

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod address;
pub mod auth;
pub mod backup;
pub mod config;
pub mod error;
pub mod ledger;
pub mod query;
pub mod storage;
pub mod types;

// Re-exports
pub use address::{is_valid_address, normalize, Address};
pub use auth::{CredentialCheck, SharedSecret};
pub use config::LedgerConfig;
pub use error::{Error, Result};
pub use ledger::{ReferralLedger, RegisterOutcome, Settlement};
pub use query::{PayoutEntry, PayoutList, ReferralStatus};
pub use storage::{JsonFileStorage, MemoryStorage, Persistence};
pub use types::{LedgerState, ReferralRecord};
