//! Store Errors
//!
//! Error types for persistence operations.

use uuid::Uuid;

/// Errors that can occur in a store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Balance update targeted a user that does not exist
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// Balance update would drive the balance below zero
    #[error("Balance of user {0} would become negative")]
    NegativeBalance(Uuid),

    /// Balance update would exceed the representable range
    #[error("Balance overflow for user {0}")]
    BalanceOverflow(Uuid),

    /// Stored row violates a domain invariant
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// Failure injected by the in-memory store
    #[error("Injected failure at {0}")]
    Injected(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;
