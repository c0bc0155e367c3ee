//! Postgres Store
//!
//! sqlx-backed implementation of the store ports. Each unit of work wraps a
//! database transaction; `lock_users` uses `SELECT ... FOR UPDATE` so balance
//! checks run against rows no concurrent transaction can modify.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{CoinTransaction, Coins, InventoryEntry, NewUser, Product, User};

use super::{
    CatalogRepository, InventoryRepository, Store, StoreError, StoreResult, TransactionRepository,
    UnitOfWork, UserRepository,
};

type UserRow = (Uuid, String, String, i64);
type TransactionRow = (Uuid, Uuid, Uuid, i64, DateTime<Utc>);

fn user_from_row((id, username, password_hash, balance): UserRow) -> StoreResult<User> {
    let balance = Coins::new(balance)
        .map_err(|e| StoreError::Corrupt(format!("user {}: {}", id, e)))?;
    Ok(User {
        id,
        username,
        password_hash,
        balance,
    })
}

fn transaction_from_row(
    (id, from_user, to_user, amount, created_at): TransactionRow,
) -> StoreResult<CoinTransaction> {
    let amount = Coins::new(amount)
        .map_err(|e| StoreError::Corrupt(format!("transaction {}: {}", id, e)))?;
    Ok(CoinTransaction {
        id,
        from_user,
        to_user,
        amount,
        created_at,
    })
}

/// Postgres-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// Unit of work over one Postgres transaction. Rolled back on drop.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UserRepository for PgUnitOfWork {
    async fn find_user_by_username(&mut self, username: &str) -> StoreResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, password, balance FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(user_from_row).transpose()
    }

    async fn find_user_by_id(&mut self, id: Uuid) -> StoreResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, username, password, balance FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *self.tx)
                .await?;

        row.map(user_from_row).transpose()
    }

    async fn lock_users(&mut self, usernames: &[&str]) -> StoreResult<Vec<User>> {
        let names: Vec<String> = usernames.iter().map(|name| name.to_string()).collect();

        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT id, username, password, balance
            FROM users
            WHERE username = ANY($1)
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(&names)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(user_from_row).collect()
    }

    async fn insert_user(&mut self, user: &NewUser) -> StoreResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            INSERT INTO users (id, username, password, balance)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (username) DO NOTHING
            RETURNING id, username, password, balance
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.balance.value())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(user_from_row).transpose()
    }

    async fn adjust_balance(&mut self, user_id: Uuid, delta: i64) -> StoreResult<Coins> {
        let balance: Option<i64> = sqlx::query_scalar(
            "UPDATE users SET balance = balance + $2 WHERE id = $1 RETURNING balance",
        )
        .bind(user_id)
        .bind(delta)
        .fetch_optional(&mut *self.tx)
        .await?;

        let balance = balance.ok_or(StoreError::UserNotFound(user_id))?;
        Coins::new(balance).map_err(|_| StoreError::NegativeBalance(user_id))
    }
}

#[async_trait]
impl TransactionRepository for PgUnitOfWork {
    async fn record_transfer(
        &mut self,
        from_user: Uuid,
        to_user: Uuid,
        amount: Coins,
    ) -> StoreResult<CoinTransaction> {
        let row: TransactionRow = sqlx::query_as(
            r#"
            INSERT INTO transactions (id, from_user_id, to_user_id, amount)
            VALUES ($1, $2, $3, $4)
            RETURNING id, from_user_id, to_user_id, amount, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(from_user)
        .bind(to_user)
        .bind(amount.value())
        .fetch_one(&mut *self.tx)
        .await?;

        transaction_from_row(row)
    }

    async fn transfers_for_user(&mut self, user_id: Uuid) -> StoreResult<Vec<CoinTransaction>> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, from_user_id, to_user_id, amount, created_at
            FROM transactions
            WHERE from_user_id = $1 OR to_user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(transaction_from_row).collect()
    }
}

#[async_trait]
impl InventoryRepository for PgUnitOfWork {
    async fn record_purchase(
        &mut self,
        user_id: Uuid,
        item_name: &str,
        quantity: i32,
    ) -> StoreResult<InventoryEntry> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO inventory (id, user_id, item_type, quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(item_name)
        .bind(quantity)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(InventoryEntry {
            id,
            user_id,
            item_name: item_name.to_string(),
            quantity,
        })
    }

    async fn purchases_for_user(&mut self, user_id: Uuid) -> StoreResult<Vec<InventoryEntry>> {
        let rows: Vec<(Uuid, Uuid, String, i32)> = sqlx::query_as(
            "SELECT id, user_id, item_type, quantity FROM inventory WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, user_id, item_name, quantity)| InventoryEntry {
                id,
                user_id,
                item_name,
                quantity,
            })
            .collect())
    }
}

#[async_trait]
impl CatalogRepository for PgUnitOfWork {
    async fn find_item(&mut self, name: &str) -> StoreResult<Option<Product>> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT name, price FROM items WHERE name = $1")
                .bind(name)
                .fetch_optional(&mut *self.tx)
                .await?;

        row.map(|(name, price)| {
            let price = Coins::new(price)
                .map_err(|e| StoreError::Corrupt(format!("item {}: {}", name, e)))?;
            Ok(Product { name, price })
        })
        .transpose()
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let PgUnitOfWork { tx } = *self;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_from_row_rejects_negative_balance() {
        let id = Uuid::new_v4();
        let result = user_from_row((id, "alice".to_string(), "hash".to_string(), -1));
        assert!(matches!(result, Err(StoreError::Corrupt(_))));

        let user = user_from_row((id, "alice".to_string(), "hash".to_string(), 1000)).unwrap();
        assert_eq!(user.balance.value(), 1000);
    }
}
