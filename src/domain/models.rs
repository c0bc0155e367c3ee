//! Marketplace records
//!
//! Users, ledger transactions, catalog products and inventory rows, plus the
//! read-side shapes assembled from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Coins;

/// Balance granted to a user on first authentication.
pub const DEFAULT_STARTING_BALANCE: i64 = 1000;

/// A registered user. `balance` is authoritative and mutated only by the
/// transfer and purchase handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Salted password digest (see `auth::password`)
    pub password_hash: String,
    pub balance: Coins,
}

/// Data needed to register a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub balance: Coins,
}

/// One completed coin transfer. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinTransaction {
    pub id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub amount: Coins,
    pub created_at: DateTime<Utc>,
}

/// Catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: Coins,
}

impl Product {
    pub fn new(name: impl Into<String>, price: i64) -> Result<Self, super::CoinsError> {
        Ok(Self {
            name: name.into(),
            price: Coins::new(price)?,
        })
    }
}

/// One inventory row; a purchase appends a row with quantity 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub item_name: String,
    pub quantity: i32,
}

/// Inventory rows coalesced per item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchasedItem {
    pub item_name: String,
    pub quantity: i64,
}

/// A transfer as seen by one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinTransferInfo {
    pub amount: Coins,
    /// Username of the other party
    pub username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoinHistory {
    pub received: Vec<CoinTransferInfo>,
    pub sent: Vec<CoinTransferInfo>,
}

/// Aggregate returned by the account info query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub coins: Coins,
    pub inventory: Vec<PurchasedItem>,
    pub coin_history: CoinHistory,
}

/// The merch catalogue shipped with the service.
pub fn default_catalog() -> Vec<Product> {
    [
        ("t-shirt", 80),
        ("cup", 20),
        ("book", 50),
        ("pen", 10),
        ("powerbank", 200),
        ("hoody", 300),
        ("umbrella", 200),
        ("socks", 10),
        ("wallet", 50),
        ("pink-hoody", 500),
    ]
    .into_iter()
    .filter_map(|(name, price)| Product::new(name, price).ok())
    .collect()
}
