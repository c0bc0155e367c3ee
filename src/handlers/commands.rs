//! Command definitions
//!
//! Commands represent intentions to change the system state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Coins;

// =========================================================================
// AuthenticateCommand
// =========================================================================

/// Command to log in, registering the user on first use
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticateCommand {
    pub username: String,
    pub password: String,
}

impl AuthenticateCommand {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// =========================================================================
// SendCoinsCommand
// =========================================================================

/// Command to transfer coins between users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendCoinsCommand {
    /// Username of the sender (taken from the credential)
    pub from_username: String,
    pub to_username: String,
    pub amount: Coins,
}

impl SendCoinsCommand {
    pub fn new(from_username: impl Into<String>, to_username: impl Into<String>, amount: Coins) -> Self {
        Self {
            from_username: from_username.into(),
            to_username: to_username.into(),
            amount,
        }
    }
}

// =========================================================================
// BuyItemCommand
// =========================================================================

/// Command to buy one catalog item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyItemCommand {
    pub username: String,
    pub item_name: String,
}

impl BuyItemCommand {
    pub fn new(username: impl Into<String>, item_name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            item_name: item_name.into(),
        }
    }
}

/// Result of a successful authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResult {
    pub token: String,
    /// True when this call created the user
    pub registered: bool,
}

/// Result of a successful transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResult {
    pub transaction_id: Uuid,
    pub from_username: String,
    pub to_username: String,
    pub amount: Coins,
    /// Sender balance after the transfer
    pub sender_balance: Coins,
}

/// Result of a successful purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseResult {
    pub inventory_id: Uuid,
    pub item_name: String,
    pub price: Coins,
    /// Buyer balance after the purchase
    pub balance: Coins,
}
