//! Account Handler
//!
//! Login with auto-registration, and the read side: balance, coalesced
//! inventory and directional coin history.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use uuid::Uuid;

use crate::auth::{hash_password, verify_password, TokenService};
use crate::domain::{
    CoinHistory, CoinTransaction, CoinTransferInfo, Coins, DomainError, InventoryEntry, NewUser,
    OperationContext, PurchasedItem, UserInfo,
};
use crate::error::AppError;
use crate::store::{Store, UnitOfWork};

use super::{AuthResult, AuthenticateCommand};

/// Handler for authentication and account queries
pub struct AccountHandler {
    store: Arc<dyn Store>,
    tokens: TokenService,
    starting_balance: Coins,
}

impl AccountHandler {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService, starting_balance: Coins) -> Self {
        Self {
            store,
            tokens,
            starting_balance,
        }
    }

    // =========================================================================
    // Authenticate
    // =========================================================================

    /// Verify credentials, registering unknown usernames, and issue a token.
    pub async fn authenticate(
        &self,
        command: AuthenticateCommand,
        context: &OperationContext,
    ) -> Result<AuthResult, AppError> {
        let AuthenticateCommand { username, password } = command;

        if username.is_empty() || password.is_empty() {
            return Err(DomainError::InvalidInput(
                "username and password cannot be empty".to_string(),
            )
            .into());
        }

        let mut uow = self.store.begin().await?;

        let (user, registered) = match uow.find_user_by_username(&username).await? {
            Some(user) => (user, false),
            None => {
                let new_user = NewUser {
                    username: username.clone(),
                    password_hash: hash_password(&password),
                    balance: self.starting_balance,
                };
                match uow
                    .insert_user(&new_user)
                    .await
                    .map_err(AppError::Registration)?
                {
                    Some(user) => (user, true),
                    // Registered concurrently by another request
                    None => {
                        let user = uow
                            .find_user_by_username(&username)
                            .await?
                            .ok_or_else(|| {
                                AppError::Internal(format!(
                                    "user {} vanished during registration",
                                    username
                                ))
                            })?;
                        (user, false)
                    }
                }
            }
        };

        if !registered && !verify_password(&password, &user.password_hash) {
            tracing::warn!(
                username = %username,
                correlation_id = ?context.correlation_id,
                "Authentication rejected: bad password"
            );
            return Err(DomainError::InvalidCredentials.into());
        }

        uow.commit().await.map_err(|e| {
            if registered {
                AppError::Registration(e)
            } else {
                AppError::Storage(e)
            }
        })?;

        if registered {
            tracing::info!(
                username = %username,
                balance = %user.balance,
                correlation_id = ?context.correlation_id,
                "User registered"
            );
        }

        let token = self
            .tokens
            .issue(&user.username)
            .map_err(AppError::TokenGeneration)?;

        Ok(AuthResult { token, registered })
    }

    // =========================================================================
    // Account queries
    // =========================================================================

    /// Balance, inventory and coin history of `username`, read inside one
    /// unit of work. On Postgres each statement sees its own snapshot.
    pub async fn user_info(&self, username: &str) -> Result<UserInfo, AppError> {
        let mut uow = self.store.begin().await?;

        let user = uow
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(username.to_string()))?;

        let inventory = load_purchased_items(uow.as_mut(), user.id).await?;
        let coin_history = load_coin_history(uow.as_mut(), user.id).await?;

        uow.commit().await?;

        Ok(UserInfo {
            coins: user.balance,
            inventory,
            coin_history,
        })
    }

    /// Purchased items of a user, one entry per item name.
    pub async fn purchased_items(&self, user_id: Uuid) -> Result<Vec<PurchasedItem>, AppError> {
        let mut uow = self.store.begin().await?;
        let items = load_purchased_items(uow.as_mut(), user_id).await?;
        uow.commit().await?;
        Ok(items)
    }

    /// Transfers of a user, split into sent and received.
    pub async fn coin_history(&self, user_id: Uuid) -> Result<CoinHistory, AppError> {
        let mut uow = self.store.begin().await?;
        let history = load_coin_history(uow.as_mut(), user_id).await?;
        uow.commit().await?;
        Ok(history)
    }
}

async fn load_purchased_items(
    uow: &mut dyn UnitOfWork,
    user_id: Uuid,
) -> Result<Vec<PurchasedItem>, AppError> {
    let entries = uow.purchases_for_user(user_id).await?;
    Ok(coalesce_inventory(&entries))
}

async fn load_coin_history(
    uow: &mut dyn UnitOfWork,
    user_id: Uuid,
) -> Result<CoinHistory, AppError> {
    let records = uow.transfers_for_user(user_id).await?;

    let mut usernames: HashMap<Uuid, String> = HashMap::new();
    for record in &records {
        let counterpart = if record.from_user == user_id {
            record.to_user
        } else {
            record.from_user
        };
        if usernames.contains_key(&counterpart) {
            continue;
        }
        let user = uow
            .find_user_by_id(counterpart)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(counterpart.to_string()))?;
        usernames.insert(counterpart, user.username);
    }

    Ok(split_history(user_id, &records, &usernames))
}

/// Sum quantities per item name. Output is ordered by item name.
pub fn coalesce_inventory(entries: &[InventoryEntry]) -> Vec<PurchasedItem> {
    let mut totals: BTreeMap<&str, i64> = BTreeMap::new();
    for entry in entries {
        *totals.entry(entry.item_name.as_str()).or_insert(0) += i64::from(entry.quantity);
    }

    totals
        .into_iter()
        .map(|(item_name, quantity)| PurchasedItem {
            item_name: item_name.to_string(),
            quantity,
        })
        .collect()
}

/// Partition ledger records into sent/received from `user_id`'s point of view,
/// keeping the input order within each side. `usernames` maps counterpart ids
/// to usernames.
pub fn split_history(
    user_id: Uuid,
    records: &[CoinTransaction],
    usernames: &HashMap<Uuid, String>,
) -> CoinHistory {
    let mut history = CoinHistory::default();

    for record in records {
        if record.from_user == user_id {
            history.sent.push(CoinTransferInfo {
                amount: record.amount,
                username: usernames.get(&record.to_user).cloned().unwrap_or_default(),
            });
        } else if record.to_user == user_id {
            history.received.push(CoinTransferInfo {
                amount: record.amount,
                username: usernames.get(&record.from_user).cloned().unwrap_or_default(),
            });
        }
    }

    history
}
