//! Wallet address normalization and validation
//!
//! Addresses are compared as lowercase strings. The format predicate only
//! checks the `0x` prefix and total length; hex content is not verified.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Required prefix for wallet addresses
pub const ADDRESS_PREFIX: &str = "0x";

/// Total length of a wallet address, prefix included
pub const ADDRESS_LEN: usize = 42;

/// True iff `s` starts with `0x` and is exactly 42 characters long
pub fn is_valid_address(s: &str) -> bool {
    s.starts_with(ADDRESS_PREFIX) && s.chars().count() == ADDRESS_LEN
}

/// Lowercase an address as received from a caller
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
}

/// Normalized, validated wallet address
///
/// Deserialization goes through [`Address::parse`], so documents read from
/// disk are normalized the same way as caller input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Normalize then validate a raw address
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = normalize(raw);
        if !is_valid_address(&normalized) {
            return Err(Error::InvalidAddress(raw.to_string()));
        }
        Ok(Self(normalized))
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Address {
    type Error = Error;

    fn try_from(raw: String) -> Result<Self> {
        Self::parse(&raw)
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
