//! Shared-secret credential checks

use subtle::ConstantTimeEq;

/// Verifies a credential presented by a caller
pub trait CredentialCheck: Send + Sync {
    /// True if `presented` is accepted
    fn verify(&self, presented: &str) -> bool;
}

/// Static secret compared in constant time
///
/// An empty configured secret accepts nothing.
pub struct SharedSecret {
    expected: String,
}

impl SharedSecret {
    /// Create from the configured value
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl CredentialCheck for SharedSecret {
    fn verify(&self, presented: &str) -> bool {
        if self.expected.is_empty() {
            return false;
        }
        self.expected.as_bytes().ct_eq(presented.as_bytes()).into()
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecret")
            .field("expected", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_secret() {
        let secret = SharedSecret::new("VALID_FAUCET_USAGE");
        assert!(secret.verify("VALID_FAUCET_USAGE"));
    }

    #[test]
    fn test_mismatch_and_length_difference() {
        let secret = SharedSecret::new("VALID_FAUCET_USAGE");
        assert!(!secret.verify("VALID_FAUCET_USAGF"));
        assert!(!secret.verify("VALID"));
        assert!(!secret.verify(""));
    }

    #[test]
    fn test_empty_secret_rejects_everything() {
        let secret = SharedSecret::new("");
        assert!(!secret.verify(""));
        assert!(!secret.verify("anything"));
    }

    #[test]
    fn test_debug_redacts() {
        let secret = SharedSecret::new("hunter2");
        assert!(!format!("{:?}", secret).contains("hunter2"));
    }
}
