//! Store module
//!
//! Persistence ports used by the handlers, with a Postgres implementation and
//! an in-memory implementation for tests.
//!
//! All access goes through a [`UnitOfWork`]: a transaction that is committed
//! explicitly and rolled back when dropped. Handlers perform every read, lock
//! and write of one operation through a single unit of work, so a failure at
//! any step leaves the store unchanged.

mod error;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{CoinTransaction, Coins, InventoryEntry, NewUser, Product, User};

pub use error::{StoreError, StoreResult};
pub use memory::{FailPoint, MemoryStore};
pub use postgres::PgStore;

/// Users and their balances.
#[async_trait]
pub trait UserRepository: Send {
    async fn find_user_by_username(&mut self, username: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_id(&mut self, id: Uuid) -> StoreResult<Option<User>>;

    /// Lock the named users for the rest of the unit of work and return those
    /// that exist. Locks are taken in `id` order, so two units of work locking
    /// overlapping sets cannot deadlock on each other.
    async fn lock_users(&mut self, usernames: &[&str]) -> StoreResult<Vec<User>>;

    /// Insert a user. Returns `None` when the username is already taken.
    async fn insert_user(&mut self, user: &NewUser) -> StoreResult<Option<User>>;

    /// Add `delta` to the balance and return the new balance.
    async fn adjust_balance(&mut self, user_id: Uuid, delta: i64) -> StoreResult<Coins>;
}

/// Append-only ledger of coin transfers.
#[async_trait]
pub trait TransactionRepository: Send {
    async fn record_transfer(
        &mut self,
        from_user: Uuid,
        to_user: Uuid,
        amount: Coins,
    ) -> StoreResult<CoinTransaction>;

    /// Transfers where the user is sender or recipient, oldest first.
    async fn transfers_for_user(&mut self, user_id: Uuid) -> StoreResult<Vec<CoinTransaction>>;
}

/// Per-user purchase rows.
#[async_trait]
pub trait InventoryRepository: Send {
    async fn record_purchase(
        &mut self,
        user_id: Uuid,
        item_name: &str,
        quantity: i32,
    ) -> StoreResult<InventoryEntry>;

    async fn purchases_for_user(&mut self, user_id: Uuid) -> StoreResult<Vec<InventoryEntry>>;
}

/// Read-only item catalog.
#[async_trait]
pub trait CatalogRepository: Send {
    async fn find_item(&mut self, name: &str) -> StoreResult<Option<Product>>;
}

/// One atomic transaction against the store.
#[async_trait]
pub trait UnitOfWork:
    UserRepository + TransactionRepository + InventoryRepository + CatalogRepository
{
    /// Make every write of this unit of work visible. Dropping without
    /// committing discards them.
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

/// Store handle shared by all handlers.
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>>;
}
