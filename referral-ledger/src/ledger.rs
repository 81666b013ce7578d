//! Ledger store: the only mutator of referral state
//!
//! Every mutation runs under an upgradable read lock, so mutations are
//! serialized while readers keep going. The next state is built on a copy,
//! persisted, and only then swapped in under a short write lock. A failed
//! save leaves memory untouched.
//!
//! # Example
//!
//! ```no_run
//! use referral_ledger::{JsonFileStorage, LedgerConfig, ReferralLedger, SharedSecret};
//! use std::sync::Arc;
//!
//! fn main() -> referral_ledger::Result<()> {
//!     let config = LedgerConfig::default();
//!     let storage = Arc::new(JsonFileStorage::new(&config.data_file));
//!     let token = Arc::new(SharedSecret::new("faucet-token"));
//!     let ledger = ReferralLedger::open(config, storage, token)?;
//!
//!     ledger.register("0x1111111111111111111111111111111111111111")?;
//!     ledger.attach_referee(
//!         "0x1111111111111111111111111111111111111111",
//!         "0x2222222222222222222222222222222222222222",
//!         "faucet-token",
//!     )?;
//!     Ok(())
//! }
//! ```

use crate::{
    address::Address,
    auth::CredentialCheck,
    storage::Persistence,
    types::{LedgerState, ReferralRecord},
    Error, LedgerConfig, Result,
};
use parking_lot::{RwLock, RwLockReadGuard, RwLockUpgradableReadGuard};
use std::sync::Arc;

/// Result of a registration request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// A new registration record was appended
    Created,
    /// A registration record already existed
    AlreadyRegistered,
    /// Referrer is at the cap; nothing appended
    CapReached,
}

/// Result of a settlement sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    /// Records moved to the archive by this sweep
    pub settled: usize,
    /// Archive size after the sweep
    pub archived_total: usize,
}

/// Shared referral ledger
pub struct ReferralLedger {
    state: RwLock<LedgerState>,
    storage: Arc<dyn Persistence>,
    faucet_token: Arc<dyn CredentialCheck>,
    config: LedgerConfig,
}

impl ReferralLedger {
    /// Load the ledger through `storage`
    pub fn open(
        config: LedgerConfig,
        storage: Arc<dyn Persistence>,
        faucet_token: Arc<dyn CredentialCheck>,
    ) -> Result<Self> {
        let state = storage.load()?;

        tracing::info!(
            active = state.active.len(),
            archived = state.archived.len(),
            referral_cap = config.referral_cap,
            "Referral ledger opened"
        );

        Ok(Self {
            state: RwLock::new(state),
            storage,
            faucet_token,
            config,
        })
    }

    /// Ledger configuration
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Register a referrer
    ///
    /// Succeeds whether or not a record was created.
    pub fn register(&self, referrer: &str) -> Result<RegisterOutcome> {
        let referrer = Address::parse(referrer)?;

        let guard = self.state.upgradable_read();
        if guard.has_registration(&referrer) {
            tracing::debug!(referrer = %referrer, "Referrer already registered");
            return Ok(RegisterOutcome::AlreadyRegistered);
        }
        if guard.active_count_for(&referrer) >= self.config.referral_cap {
            tracing::warn!(referrer = %referrer, "Referrer at cap, registration skipped");
            return Ok(RegisterOutcome::CapReached);
        }

        let mut next = (*guard).clone();
        next.active.push(ReferralRecord::registration(referrer.clone()));
        self.commit(guard, next)?;

        tracing::info!(referrer = %referrer, "Referrer registered");
        Ok(RegisterOutcome::Created)
    }

    /// Attach `referee` to `referrer`
    ///
    /// Checks run in order: address format, access token, duplicate referee,
    /// referrer cap. The first failure is returned and nothing is written.
    pub fn attach_referee(
        &self,
        referrer: &str,
        referee: &str,
        access_token: &str,
    ) -> Result<ReferralRecord> {
        let referrer = Address::parse(referrer)?;
        let referee = Address::parse(referee)?;

        if !self.faucet_token.verify(access_token) {
            tracing::warn!(referrer = %referrer, referee = %referee, "Rejected referral with bad token");
            return Err(Error::Unauthorized);
        }

        let guard = self.state.upgradable_read();
        if guard.has_active_referee(&referee) {
            return Err(Error::DuplicateReferee(referee.to_string()));
        }
        if guard.active_count_for(&referrer) >= self.config.referral_cap {
            return Err(Error::CapExceeded {
                referrer: referrer.to_string(),
                cap: self.config.referral_cap,
            });
        }

        let record = ReferralRecord::referral(referrer, referee);
        let mut next = (*guard).clone();
        next.active.push(record.clone());
        self.commit(guard, next)?;

        tracing::info!(
            referrer = %record.referrer,
            referee = record.referee_str(),
            "Referral recorded"
        );
        Ok(record)
    }

    /// Mark every active record paid and move it to the archive
    pub fn settle_all(&self) -> Result<Settlement> {
        let guard = self.state.upgradable_read();
        if guard.active.is_empty() {
            tracing::debug!("Nothing to settle");
            return Ok(Settlement {
                settled: 0,
                archived_total: guard.archived.len(),
            });
        }

        let mut next = LedgerState {
            active: Vec::new(),
            archived: Vec::with_capacity(guard.archived.len() + guard.active.len()),
        };
        next.archived.extend(guard.archived.iter().cloned());
        next.archived.extend(guard.active.iter().cloned().map(|mut record| {
            record.paid = true;
            record
        }));

        let settlement = Settlement {
            settled: guard.active.len(),
            archived_total: next.archived.len(),
        };
        self.commit(guard, next)?;

        tracing::info!(
            settled = settlement.settled,
            archived_total = settlement.archived_total,
            "Referrals settled"
        );
        Ok(settlement)
    }

    /// Consistent copy of the full state
    pub fn snapshot(&self) -> LedgerState {
        self.state.read().clone()
    }

    pub(crate) fn read_state(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read()
    }

    /// Persist `next`, then make it visible
    fn commit(
        &self,
        guard: RwLockUpgradableReadGuard<'_, LedgerState>,
        next: LedgerState,
    ) -> Result<()> {
        if let Err(e) = self.storage.save(&next) {
            tracing::error!(error = %e, "Persisting ledger failed; in-memory state unchanged");
            return Err(e);
        }
        *RwLockUpgradableReadGuard::upgrade(guard) = next;
        Ok(())
    }
}

impl std::fmt::Debug for ReferralLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("ReferralLedger")
            .field("active", &state.active.len())
            .field("archived", &state.archived.len())
            .field("config", &self.config)
            .finish()
    }
}
