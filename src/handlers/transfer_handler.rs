//! Transfer Handler
//!
//! Moves coins between two users. The whole sequence (lookup, balance check,
//! ledger append, debit, credit) runs in one unit of work with both user rows
//! locked, so concurrent transfers cannot overdraw a sender and a failed step
//! leaves no partial state behind.

use std::sync::Arc;

use crate::domain::{DomainError, OperationContext, TransferPolicy};
use crate::error::AppError;
use crate::store::Store;

use super::{SendCoinsCommand, TransferResult};

/// Handler for coin transfers
pub struct TransferHandler {
    store: Arc<dyn Store>,
    policy: TransferPolicy,
}

impl TransferHandler {
    pub fn new(store: Arc<dyn Store>, policy: TransferPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> TransferPolicy {
        self.policy
    }

    /// Execute the transfer command
    pub async fn execute(
        &self,
        command: SendCoinsCommand,
        context: &OperationContext,
    ) -> Result<TransferResult, AppError> {
        let SendCoinsCommand {
            from_username,
            to_username,
            amount,
        } = command;

        self.policy.check(&from_username, &to_username, amount)?;

        let mut uow = self.store.begin().await?;

        // Lock both rows in one statement; error order stays sender first
        let users = uow
            .lock_users(&[from_username.as_str(), to_username.as_str()])
            .await?;

        let sender = users
            .iter()
            .find(|u| u.username == from_username)
            .cloned()
            .ok_or_else(|| DomainError::SenderNotFound(from_username.clone()))?;

        let recipient = users
            .iter()
            .find(|u| u.username == to_username)
            .cloned()
            .ok_or_else(|| DomainError::RecipientNotFound(to_username.clone()))?;

        if !sender.balance.is_sufficient_for(amount) {
            tracing::warn!(
                from = %from_username,
                to = %to_username,
                amount = %amount,
                balance = %sender.balance,
                correlation_id = ?context.correlation_id,
                "Transfer rejected: insufficient funds"
            );
            return Err(DomainError::insufficient_funds(amount, sender.balance).into());
        }

        let record = uow
            .record_transfer(sender.id, recipient.id, amount)
            .await
            .map_err(AppError::LedgerWrite)?;

        let debited = uow
            .adjust_balance(sender.id, -amount.value())
            .await
            .map_err(AppError::BalanceUpdate)?;

        let credited = uow
            .adjust_balance(recipient.id, amount.value())
            .await
            .map_err(AppError::BalanceUpdate)?;

        uow.commit().await?;

        // A self transfer debits and credits the same row
        let sender_balance = if sender.id == recipient.id {
            credited
        } else {
            debited
        };

        tracing::info!(
            transaction_id = %record.id,
            from = %from_username,
            to = %to_username,
            amount = %amount,
            actor = ?context.username,
            correlation_id = ?context.correlation_id,
            "Coins transferred"
        );

        Ok(TransferResult {
            transaction_id: record.id,
            from_username,
            to_username,
            amount,
            sender_balance,
        })
    }
}
