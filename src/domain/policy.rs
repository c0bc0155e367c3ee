//! Transfer Policy
//!
//! Request-level rules for coin transfers that the ledger itself does not
//! enforce. Both rules are configurable.

use super::{Coins, DomainError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPolicy {
    /// Permit `from == to` (net balance change is zero)
    pub allow_self_transfer: bool,
    /// Permit transfers of zero coins
    pub allow_zero_amount: bool,
}

impl Default for TransferPolicy {
    fn default() -> Self {
        Self {
            allow_self_transfer: true,
            allow_zero_amount: false,
        }
    }
}

impl TransferPolicy {
    /// Most restrictive policy: no self transfers, no zero amounts.
    pub fn strict() -> Self {
        Self {
            allow_self_transfer: false,
            allow_zero_amount: false,
        }
    }

    pub fn check(&self, from: &str, to: &str, amount: Coins) -> Result<(), DomainError> {
        if !self.allow_zero_amount && amount.is_zero() {
            return Err(DomainError::ZeroAmount);
        }
        if !self.allow_self_transfer && from == to {
            return Err(DomainError::SelfTransfer);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = TransferPolicy::default();
        let ten = Coins::new(10).unwrap();

        assert_eq!(policy.check("alice", "alice", ten), Ok(()));
        assert_eq!(
            policy.check("alice", "bob", Coins::zero()),
            Err(DomainError::ZeroAmount)
        );
    }

    #[test]
    fn test_strict_policy() {
        let policy = TransferPolicy::strict();
        assert_eq!(
            policy.check("alice", "alice", Coins::new(10).unwrap()),
            Err(DomainError::SelfTransfer)
        );
        assert_eq!(policy.check("alice", "bob", Coins::new(10).unwrap()), Ok(()));
    }

    #[test]
    fn test_permissive_policy() {
        let policy = TransferPolicy {
            allow_self_transfer: true,
            allow_zero_amount: true,
        };
        assert_eq!(policy.check("alice", "alice", Coins::zero()), Ok(()));
    }
}
