//! Application state
//!
//! Handlers and the token service shared by every request.

use std::sync::Arc;

use chrono::Duration;

use crate::auth::TokenService;
use crate::config::{ConfigError, MarketSettings};
use crate::domain::Coins;
use crate::handlers::{AccountHandler, PurchaseHandler, TransferHandler};
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub transfers: Arc<TransferHandler>,
    pub purchases: Arc<PurchaseHandler>,
    pub accounts: Arc<AccountHandler>,
    pub tokens: TokenService,
}

impl AppState {
    /// Wire the handlers on top of `store`.
    pub fn new(store: Arc<dyn Store>, settings: &MarketSettings) -> Result<Self, ConfigError> {
        let starting_balance = Coins::new(settings.starting_balance)
            .map_err(|_| ConfigError::InvalidValue("STARTING_BALANCE"))?;
        let tokens = TokenService::new(
            settings.jwt_secret.as_bytes(),
            Duration::hours(settings.token_ttl_hours),
        );

        Ok(Self {
            transfers: Arc::new(TransferHandler::new(
                store.clone(),
                settings.transfer_policy,
            )),
            purchases: Arc::new(PurchaseHandler::new(store.clone())),
            accounts: Arc::new(AccountHandler::new(store, tokens.clone(), starting_balance)),
            tokens,
        })
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .field("transfer_policy", &self.transfers.policy())
            .finish_non_exhaustive()
    }
}
