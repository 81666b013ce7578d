// Wire models for the referral API

use referral_ledger::{PayoutEntry, PayoutList, ReferralRecord, ReferralStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterReferralRequest {
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UseReferralRequest {
    #[serde(default)]
    pub referrer: String,
    #[serde(default)]
    pub referee: String,
    #[serde(default)]
    pub faucet_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReferralStatusResponse {
    pub total_referrals: usize,
    pub paid: usize,
    pub unpaid: usize,
    pub referrals: Vec<ReferralRecord>,
}

impl From<ReferralStatus> for ReferralStatusResponse {
    fn from(status: ReferralStatus) -> Self {
        Self {
            total_referrals: status.total_referrals,
            paid: status.paid,
            unpaid: status.unpaid,
            referrals: status.referrals,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PayoutListResponse {
    pub total_people: usize,
    pub total_ommv_to_send: u64,
    pub multisend_list: Vec<PayoutEntry>,
}

impl From<PayoutList> for PayoutListResponse {
    fn from(list: PayoutList) -> Self {
        Self {
            total_people: list.total_people,
            total_ommv_to_send: list.total_amount,
            multisend_list: list.entries,
        }
    }
}
