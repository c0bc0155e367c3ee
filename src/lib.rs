//! coin_market Library
//!
//! Re-exports modules for integration testing and the binaries.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod state;
pub mod store;

mod error;

pub use config::{Config, MarketSettings};
pub use domain::{Coins, CoinsError, DomainError, OperationContext, TransferPolicy};
pub use error::{ApiError, AppError, ErrorResponse};
pub use state::AppState;
