//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

use super::Coins;

/// Marketplace rule violations.
///
/// Every variant is raised before any mutation is attempted, so returning one
/// of these leaves stored state untouched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Malformed caller input (empty credentials, empty item name)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Sender not found: {0}")]
    SenderNotFound(String),

    #[error("Recipient not found: {0}")]
    RecipientNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Balance does not cover the debit
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Coins, available: Coins },

    /// Password does not match the registered user
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Cannot transfer coins to yourself")]
    SelfTransfer,

    #[error("Transfer amount must be greater than zero")]
    ZeroAmount,
}

impl DomainError {
    pub fn insufficient_funds(required: Coins, available: Coins) -> Self {
        Self::InsufficientFunds {
            required,
            available,
        }
    }

    /// Check if this error is a lookup miss
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SenderNotFound(_)
                | Self::RecipientNotFound(_)
                | Self::UserNotFound(_)
                | Self::ItemNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_funds_error() {
        let err = DomainError::insufficient_funds(
            Coins::new(100).unwrap(),
            Coins::new(50).unwrap(),
        );

        assert!(!err.is_not_found());
        assert!(err.to_string().contains("100"));
        assert!(err.to_string().contains("50"));
    }

    #[test]
    fn test_not_found_classification() {
        assert!(DomainError::SenderNotFound("a".into()).is_not_found());
        assert!(DomainError::ItemNotFound("cup".into()).is_not_found());
        assert!(!DomainError::InvalidCredentials.is_not_found());
    }
}
