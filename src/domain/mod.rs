//! Domain module
//!
//! Core domain types and business rules.

pub mod coins;
pub mod context;
pub mod error;
pub mod models;
pub mod policy;

pub use coins::{Coins, CoinsError};
pub use context::OperationContext;
pub use error::DomainError;
pub use models::{
    default_catalog, CoinHistory, CoinTransaction, CoinTransferInfo, InventoryEntry, NewUser,
    Product, PurchasedItem, User, UserInfo, DEFAULT_STARTING_BALANCE,
};
pub use policy::TransferPolicy;
