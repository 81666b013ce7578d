//! Core types for the referral ledger
//!
//! The serialized layout matches the persisted document:
//! `{"referrals": [...], "paid_referrals": [...]}` where an unattached
//! referee is written as the empty string.

use crate::address::Address;
use serde::{Deserialize, Serialize};

/// A single referral entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralRecord {
    /// Inviting wallet
    pub referrer: Address,

    /// Invited wallet (`None` for a bare registration)
    #[serde(default, with = "referee_field")]
    pub referee: Option<Address>,

    /// Settled flag
    #[serde(default)]
    pub paid: bool,
}

impl ReferralRecord {
    /// Registration record with no referee attached yet
    pub fn registration(referrer: Address) -> Self {
        Self {
            referrer,
            referee: None,
            paid: false,
        }
    }

    /// Referral record linking a referee to its referrer
    pub fn referral(referrer: Address, referee: Address) -> Self {
        Self {
            referrer,
            referee: Some(referee),
            paid: false,
        }
    }

    /// Referee as stored on the wire (empty when unattached)
    pub fn referee_str(&self) -> &str {
        self.referee.as_ref().map(Address::as_str).unwrap_or("")
    }
}

/// Complete ledger contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    /// Outstanding referrals, insertion order
    #[serde(rename = "referrals", default)]
    pub active: Vec<ReferralRecord>,

    /// Settled referrals, append-only
    #[serde(rename = "paid_referrals", default)]
    pub archived: Vec<ReferralRecord>,
}

impl LedgerState {
    /// Number of active records held by `referrer`
    pub fn active_count_for(&self, referrer: &Address) -> usize {
        self.active.iter().filter(|r| &r.referrer == referrer).count()
    }

    /// True if `referee` is attached to any active record
    pub fn has_active_referee(&self, referee: &Address) -> bool {
        self.active
            .iter()
            .any(|r| r.referee.as_ref() == Some(referee))
    }

    /// True if `referrer` has a registration record without referee
    pub fn has_registration(&self, referrer: &Address) -> bool {
        self.active
            .iter()
            .any(|r| &r.referrer == referrer && r.referee.is_none())
    }
}

/// Empty string on the wire, `None` in memory
mod referee_field {
    use crate::address::Address;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Address>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.as_ref().map(Address::as_str).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Address>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) if !raw.is_empty() => {
                Address::parse(&raw).map(Some).map_err(D::Error::custom)
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(c: char) -> Address {
        Address::parse(&format!("0x{}", c.to_string().repeat(40))).unwrap()
    }

    #[test]
    fn test_registration_serializes_empty_referee() {
        let record = ReferralRecord::registration(addr('a'));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["referee"], "");
        assert_eq!(json["paid"], false);
    }

    #[test]
    fn test_empty_and_null_referee_read_as_none() {
        let a = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
        for doc in [
            format!(r#"{{"referrer":"{a}","referee":"","paid":false}}"#),
            format!(r#"{{"referrer":"{a}","referee":null,"paid":false}}"#),
            format!(r#"{{"referrer":"{a}"}}"#),
        ] {
            let record: ReferralRecord = serde_json::from_str(&doc).unwrap();
            assert_eq!(record.referee, None);
            assert!(!record.paid);
        }
    }

    #[test]
    fn test_stored_addresses_are_normalized() {
        let doc = r#"{"referrer":"0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA","referee":"0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB"}"#;
        let record: ReferralRecord = serde_json::from_str(doc).unwrap();
        assert_eq!(record, ReferralRecord::referral(addr('a'), addr('b')));

        let bad = r#"{"referrer":"0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa","referee":"0x12"}"#;
        assert!(serde_json::from_str::<ReferralRecord>(bad).is_err());
    }

    #[test]
    fn test_state_wire_names() {
        let state = LedgerState {
            active: vec![ReferralRecord::referral(addr('a'), addr('b'))],
            archived: vec![],
        };
        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("referrals").is_some());
        assert!(json.get("paid_referrals").is_some());
        assert_eq!(json["referrals"][0]["referee"], addr('b').as_str());
    }

    #[test]
    fn test_counts() {
        let state = LedgerState {
            active: vec![
                ReferralRecord::registration(addr('a')),
                ReferralRecord::referral(addr('a'), addr('b')),
            ],
            archived: vec![],
        };
        assert_eq!(state.active_count_for(&addr('a')), 2);
        assert!(state.has_active_referee(&addr('b')));
        assert!(!state.has_active_referee(&addr('a')));
        assert!(state.has_registration(&addr('a')));
    }
}
