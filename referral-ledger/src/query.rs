//! Read-only views over the ledger
//!
//! Queries only look at the active set. Once settled, a referral is
//! invisible to both the status view and the payout list.

use crate::{
    address::normalize,
    ledger::ReferralLedger,
    types::{LedgerState, ReferralRecord},
};
use serde::{Deserialize, Serialize};

/// Referral summary for one referrer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralStatus {
    /// Matching active records
    pub total_referrals: usize,
    /// Matching records marked paid
    pub paid: usize,
    /// Matching records not yet paid
    pub unpaid: usize,
    /// Matching records, insertion order
    pub referrals: Vec<ReferralRecord>,
}

/// One wallet to pay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutEntry {
    /// Destination wallet (empty for an unattached registration)
    pub wallet: String,
    /// Reward units
    pub amount: u64,
}

/// Disbursement list for all unpaid referrals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutList {
    /// Number of entries
    pub total_people: usize,
    /// Sum of all entry amounts
    pub total_amount: u64,
    /// Referrer/referee pairs, record order
    pub entries: Vec<PayoutEntry>,
}

/// Status of `address` as a referrer
pub fn status_for(state: &LedgerState, address: &str) -> ReferralStatus {
    let address = normalize(address);
    let referrals: Vec<ReferralRecord> = state
        .active
        .iter()
        .filter(|r| r.referrer.as_str() == address)
        .cloned()
        .collect();

    let paid = referrals.iter().filter(|r| r.paid).count();
    ReferralStatus {
        total_referrals: referrals.len(),
        paid,
        unpaid: referrals.len() - paid,
        referrals,
    }
}

/// Two entries per unpaid active record, `reward` each
pub fn payout_list(state: &LedgerState, reward: u64) -> PayoutList {
    let mut entries = Vec::with_capacity(state.active.len() * 2);
    let mut placeholders = 0usize;

    for record in state.active.iter().filter(|r| !r.paid) {
        if record.referee.is_none() {
            placeholders += 1;
        }
        entries.push(PayoutEntry {
            wallet: record.referrer.to_string(),
            amount: reward,
        });
        entries.push(PayoutEntry {
            wallet: record.referee_str().to_string(),
            amount: reward,
        });
    }

    if placeholders > 0 {
        tracing::warn!(
            placeholders,
            "Payout list contains entries with an empty wallet"
        );
    }

    PayoutList {
        total_people: entries.len(),
        total_amount: entries.iter().map(|e| e.amount).sum(),
        entries,
    }
}

impl ReferralLedger {
    /// Status of `address` over the active set
    pub fn status_for(&self, address: &str) -> ReferralStatus {
        status_for(&self.read_state(), address)
    }

    /// Payout list at the configured reward
    pub fn payout_list(&self) -> PayoutList {
        payout_list(&self.read_state(), self.config().reward_per_head)
    }
}
