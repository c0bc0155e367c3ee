//! Purchase Handler
//!
//! Buys one catalog item: debits the buyer and appends an inventory row in a
//! single unit of work with the buyer row locked.

use std::sync::Arc;

use crate::domain::{DomainError, OperationContext};
use crate::error::AppError;
use crate::store::Store;

use super::{BuyItemCommand, PurchaseResult};

/// Quantity appended per purchase
const PURCHASE_QUANTITY: i32 = 1;

/// Handler for item purchases
pub struct PurchaseHandler {
    store: Arc<dyn Store>,
}

impl PurchaseHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Execute the purchase command
    pub async fn execute(
        &self,
        command: BuyItemCommand,
        context: &OperationContext,
    ) -> Result<PurchaseResult, AppError> {
        let BuyItemCommand {
            username,
            item_name,
        } = command;

        if item_name.trim().is_empty() {
            return Err(DomainError::InvalidInput("item name cannot be empty".to_string()).into());
        }

        let mut uow = self.store.begin().await?;

        let user = uow
            .lock_users(&[username.as_str()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::UserNotFound(username.clone()))?;

        // Lookup failures are reported as a missing item
        let item = match uow.find_item(&item_name).await {
            Ok(Some(item)) => item,
            Ok(None) => return Err(DomainError::ItemNotFound(item_name).into()),
            Err(e) => {
                tracing::error!(item = %item_name, error = %e, "Catalog lookup failed");
                return Err(DomainError::ItemNotFound(item_name).into());
            }
        };

        if !user.balance.is_sufficient_for(item.price) {
            tracing::warn!(
                username = %username,
                item = %item.name,
                price = %item.price,
                balance = %user.balance,
                correlation_id = ?context.correlation_id,
                "Purchase rejected: insufficient funds"
            );
            return Err(DomainError::insufficient_funds(item.price, user.balance).into());
        }

        let balance = uow
            .adjust_balance(user.id, -item.price.value())
            .await
            .map_err(AppError::BalanceUpdate)?;

        let entry = uow
            .record_purchase(user.id, &item.name, PURCHASE_QUANTITY)
            .await
            .map_err(AppError::InventoryWrite)?;

        uow.commit().await?;

        tracing::info!(
            username = %username,
            item = %item.name,
            price = %item.price,
            actor = ?context.username,
            correlation_id = ?context.correlation_id,
            "Item purchased"
        );

        Ok(PurchaseResult {
            inventory_id: entry.id,
            item_name: item.name,
            price: item.price,
            balance,
        })
    }
}
