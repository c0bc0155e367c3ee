//! Command Handlers module
//!
//! Handlers that orchestrate balance-mutating operations and account queries.
//! Each handler depends only on the `Store` port.

mod account_handler;
mod commands;
mod purchase_handler;
mod transfer_handler;


pub use account_handler::{coalesce_inventory, split_history, AccountHandler};
pub use commands::*;
pub use purchase_handler::PurchaseHandler;
pub use transfer_handler::TransferHandler;
