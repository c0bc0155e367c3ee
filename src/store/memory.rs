//! In-memory Store
//!
//! Store used by tests and local experiments. Units of work are serialized on
//! a tokio mutex; each one edits a private copy of the state that replaces the
//! shared state only on commit. Failures can be injected per write step to
//! exercise rollback paths.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::{
    CoinTransaction, Coins, CoinsError, InventoryEntry, NewUser, Product, User,
};

use super::{
    CatalogRepository, InventoryRepository, Store, StoreError, StoreResult, TransactionRepository,
    UnitOfWork, UserRepository,
};

/// Write step that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    InsertUser,
    RecordTransfer,
    RecordPurchase,
    /// `adjust_balance` with a negative delta
    DebitBalance,
    /// `adjust_balance` with a positive delta
    CreditBalance,
    Commit,
}

impl FailPoint {
    fn name(self) -> &'static str {
        match self {
            FailPoint::InsertUser => "insert_user",
            FailPoint::RecordTransfer => "record_transfer",
            FailPoint::RecordPurchase => "record_purchase",
            FailPoint::DebitBalance => "debit_balance",
            FailPoint::CreditBalance => "credit_balance",
            FailPoint::Commit => "commit",
        }
    }
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    usernames: HashMap<String, Uuid>,
    transactions: Vec<CoinTransaction>,
    inventory: Vec<InventoryEntry>,
    items: HashMap<String, Product>,
    fail_points: HashSet<FailPoint>,
}

impl MemoryState {
    fn check(&self, point: FailPoint) -> StoreResult<()> {
        if self.fail_points.contains(&point) {
            return Err(StoreError::Injected(point.name()));
        }
        Ok(())
    }
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with the given catalog
    pub fn with_catalog(items: impl IntoIterator<Item = Product>) -> Self {
        let state = MemoryState {
            items: items
                .into_iter()
                .map(|item| (item.name.clone(), item))
                .collect(),
            ..MemoryState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Make every subsequent `point` step fail until cleared.
    pub async fn fail_on(&self, point: FailPoint) {
        self.state.lock().await.fail_points.insert(point);
    }

    pub async fn clear_failures(&self) {
        self.state.lock().await.fail_points.clear();
    }

    /// Committed view of a user
    pub async fn user(&self, username: &str) -> Option<User> {
        let state = self.state.lock().await;
        state
            .usernames
            .get(username)
            .and_then(|id| state.users.get(id))
            .cloned()
    }

    /// Committed ledger, oldest first
    pub async fn transactions(&self) -> Vec<CoinTransaction> {
        self.state.lock().await.transactions.clone()
    }

    /// Committed inventory rows
    pub async fn inventory(&self) -> Vec<InventoryEntry> {
        self.state.lock().await.inventory.clone()
    }

    /// Sum of all committed balances
    pub async fn total_coins(&self) -> i64 {
        self.state
            .lock()
            .await
            .users
            .values()
            .map(|user| user.balance.value())
            .sum()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryUnitOfWork { guard, staged }))
    }
}

/// Holds the store lock for its whole lifetime.
pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

#[async_trait]
impl UserRepository for MemoryUnitOfWork {
    async fn find_user_by_username(&mut self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .staged
            .usernames
            .get(username)
            .and_then(|id| self.staged.users.get(id))
            .cloned())
    }

    async fn find_user_by_id(&mut self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.staged.users.get(&id).cloned())
    }

    async fn lock_users(&mut self, usernames: &[&str]) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self
            .staged
            .users
            .values()
            .filter(|user| usernames.contains(&user.username.as_str()))
            .cloned()
            .collect();
        users.sort_by_key(|user| user.id);
        Ok(users)
    }

    async fn insert_user(&mut self, user: &NewUser) -> StoreResult<Option<User>> {
        self.staged.check(FailPoint::InsertUser)?;

        if self.staged.usernames.contains_key(&user.username) {
            return Ok(None);
        }

        let created = User {
            id: Uuid::new_v4(),
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            balance: user.balance,
        };
        self.staged
            .usernames
            .insert(created.username.clone(), created.id);
        self.staged.users.insert(created.id, created.clone());
        Ok(Some(created))
    }

    async fn adjust_balance(&mut self, user_id: Uuid, delta: i64) -> StoreResult<Coins> {
        if delta < 0 {
            self.staged.check(FailPoint::DebitBalance)?;
        } else {
            self.staged.check(FailPoint::CreditBalance)?;
        }

        let user = self
            .staged
            .users
            .get_mut(&user_id)
            .ok_or(StoreError::UserNotFound(user_id))?;

        user.balance = user.balance.checked_apply(delta).map_err(|e| match e {
            CoinsError::Overflow => StoreError::BalanceOverflow(user_id),
            CoinsError::Negative(_) => StoreError::NegativeBalance(user_id),
        })?;
        Ok(user.balance)
    }
}

#[async_trait]
impl TransactionRepository for MemoryUnitOfWork {
    async fn record_transfer(
        &mut self,
        from_user: Uuid,
        to_user: Uuid,
        amount: Coins,
    ) -> StoreResult<CoinTransaction> {
        self.staged.check(FailPoint::RecordTransfer)?;

        let record = CoinTransaction {
            id: Uuid::new_v4(),
            from_user,
            to_user,
            amount,
            created_at: Utc::now(),
        };
        self.staged.transactions.push(record.clone());
        Ok(record)
    }

    async fn transfers_for_user(&mut self, user_id: Uuid) -> StoreResult<Vec<CoinTransaction>> {
        Ok(self
            .staged
            .transactions
            .iter()
            .filter(|t| t.from_user == user_id || t.to_user == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl InventoryRepository for MemoryUnitOfWork {
    async fn record_purchase(
        &mut self,
        user_id: Uuid,
        item_name: &str,
        quantity: i32,
    ) -> StoreResult<InventoryEntry> {
        self.staged.check(FailPoint::RecordPurchase)?;

        let entry = InventoryEntry {
            id: Uuid::new_v4(),
            user_id,
            item_name: item_name.to_string(),
            quantity,
        };
        self.staged.inventory.push(entry.clone());
        Ok(entry)
    }

    async fn purchases_for_user(&mut self, user_id: Uuid) -> StoreResult<Vec<InventoryEntry>> {
        Ok(self
            .staged
            .inventory
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CatalogRepository for MemoryUnitOfWork {
    async fn find_item(&mut self, name: &str) -> StoreResult<Option<Product>> {
        Ok(self.staged.items.get(name).cloned())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryUnitOfWork { mut guard, staged } = *self;
        guard.check(FailPoint::Commit)?;
        *guard = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, balance: i64) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "hash".to_string(),
            balance: Coins::new(balance).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let store = MemoryStore::new();

        let mut uow = store.begin().await.unwrap();
        uow.insert_user(&new_user("alice", 1000)).await.unwrap();
        uow.commit().await.unwrap();

        let alice = store.user("alice").await.unwrap();
        assert_eq!(alice.balance.value(), 1000);
    }

    #[tokio::test]
    async fn test_drop_discards_writes() {
        let store = MemoryStore::new();

        {
            let mut uow = store.begin().await.unwrap();
            uow.insert_user(&new_user("alice", 1000)).await.unwrap();
        }

        assert!(store.user("alice").await.is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_username_returns_none() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();

        assert!(uow.insert_user(&new_user("alice", 1000)).await.unwrap().is_some());
        assert!(uow.insert_user(&new_user("alice", 5)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_adjust_balance_refuses_negative() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let alice = uow.insert_user(&new_user("alice", 10)).await.unwrap().unwrap();

        let result = uow.adjust_balance(alice.id, -11).await;
        assert!(matches!(result, Err(StoreError::NegativeBalance(_))));

        let balance = uow.adjust_balance(alice.id, -10).await.unwrap();
        assert!(balance.is_zero());
    }

    #[tokio::test]
    async fn test_adjust_balance_refuses_overflow() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let rich = uow
            .insert_user(&new_user("rich", i64::MAX))
            .await
            .unwrap()
            .unwrap();

        let result = uow.adjust_balance(rich.id, 1).await;
        assert!(matches!(result, Err(StoreError::BalanceOverflow(_))));
    }

    #[tokio::test]
    async fn test_fail_point_injection() {
        let store = MemoryStore::new();
        store.fail_on(FailPoint::InsertUser).await;

        let mut uow = store.begin().await.unwrap();
        let result = uow.insert_user(&new_user("alice", 10)).await;
        assert!(matches!(result, Err(StoreError::Injected("insert_user"))));
        drop(uow);

        store.clear_failures().await;
        let mut uow = store.begin().await.unwrap();
        assert!(uow.insert_user(&new_user("alice", 10)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_lock_users_returns_existing_in_id_order() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        uow.insert_user(&new_user("alice", 10)).await.unwrap();
        uow.insert_user(&new_user("bob", 10)).await.unwrap();

        let users = uow.lock_users(&["bob", "alice", "carol"]).await.unwrap();
        assert_eq!(users.len(), 2);
        assert!(users[0].id < users[1].id);
    }
}
