//! Coins type
//!
//! Domain primitive for coin quantities (balances, transfer amounts, prices).
//! Coins are whole, non-negative numbers; a negative value cannot be
//! constructed, so a `Coins` balance can never be observed below zero.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coins represents a validated, non-negative coin quantity.
///
/// # Invariants
/// - Value is always >= 0
///
/// # Example
/// ```
/// use coin_market::domain::Coins;
///
/// let balance = Coins::new(1000).unwrap();
/// let price = Coins::new(80).unwrap();
/// assert!(balance.is_sufficient_for(price));
/// assert_eq!(balance.checked_apply(-price.value()), Ok(Coins::new(920).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Coins(i64);

/// Errors that can occur when creating or combining Coins
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoinsError {
    #[error("Coin amount cannot be negative (got {0})")]
    Negative(i64),

    #[error("Coin amount exceeds the maximum representable value")]
    Overflow,
}

impl Coins {
    /// Create a new Coins value with validation.
    ///
    /// # Errors
    /// - `CoinsError::Negative` if value < 0
    pub fn new(value: i64) -> Result<Self, CoinsError> {
        if value < 0 {
            return Err(CoinsError::Negative(value));
        }
        Ok(Self(value))
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the underlying integer value.
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check if this quantity covers `other` (used for balance checks).
    pub fn is_sufficient_for(&self, other: Coins) -> bool {
        self.0 >= other.0
    }

    /// Apply a signed delta (credit or debit).
    ///
    /// # Errors
    /// - `CoinsError::Overflow` if the result exceeds `i64::MAX`
    /// - `CoinsError::Negative` if the result would be below zero
    pub fn checked_apply(self, delta: i64) -> Result<Coins, CoinsError> {
        let value = self.0.checked_add(delta).ok_or(CoinsError::Overflow)?;
        Coins::new(value)
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Coins {
    type Error = CoinsError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Coins::new(value)
    }
}

impl From<Coins> for i64 {
    fn from(coins: Coins) -> Self {
        coins.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coins_zero_allowed() {
        let coins = Coins::new(0).unwrap();
        assert!(coins.is_zero());
        assert_eq!(coins, Coins::zero());
    }

    #[test]
    fn test_coins_negative_rejected() {
        assert_eq!(Coins::new(-1), Err(CoinsError::Negative(-1)));
    }

    #[test]
    fn test_exact_balance_is_sufficient() {
        let balance = Coins::new(50).unwrap();
        assert!(balance.is_sufficient_for(Coins::new(50).unwrap()));
        assert!(!balance.is_sufficient_for(Coins::new(51).unwrap()));
    }

    #[test]
    fn test_checked_apply() {
        let balance = Coins::new(100).unwrap();
        assert_eq!(balance.checked_apply(-100), Ok(Coins::zero()));
        assert_eq!(balance.checked_apply(-101), Err(CoinsError::Negative(-1)));
        assert_eq!(balance.checked_apply(25), Ok(Coins::new(125).unwrap()));
    }

    #[test]
    fn test_checked_apply_overflow() {
        let max = Coins::new(i64::MAX).unwrap();
        assert_eq!(max.checked_apply(1), Err(CoinsError::Overflow));
    }

    #[test]
    fn test_serde_rejects_negative() {
        let ok: Coins = serde_json::from_str("42").unwrap();
        assert_eq!(ok.value(), 42);
        assert!(serde_json::from_str::<Coins>("-42").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "42");
    }
}
