//! Load Testing Tool
//!
//! Runs a ring of users, each repeatedly sending 10 coins to the next, and
//! checks that the total coin supply of the ring is unchanged afterwards.
//!
//! Run with: cargo run --bin load_test --release -- --users 100 --rounds 30
//! Add `--memory` to run against the in-memory store instead of DATABASE_URL.

use std::sync::Arc;
use std::time::Instant;

use chrono::Duration;
use sqlx::postgres::PgPoolOptions;

use coin_market::auth::TokenService;
use coin_market::domain::{default_catalog, Coins, DomainError, OperationContext, TransferPolicy};
use coin_market::handlers::{AccountHandler, AuthenticateCommand, SendCoinsCommand, TransferHandler};
use coin_market::store::{MemoryStore, PgStore, Store};
use coin_market::AppError;

const TRANSFER_AMOUNT: i64 = 10;

fn arg_value(args: &[String], flag: &str, default: usize) -> usize {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let users = arg_value(&args, "--users", 100).max(2);
    let rounds = arg_value(&args, "--rounds", 30);
    let in_memory = args.iter().any(|a| a == "--memory");

    let store: Arc<dyn Store> = if in_memory {
        println!("Using in-memory store");
        Arc::new(MemoryStore::with_catalog(default_catalog()))
    } else {
        let database_url = std::env::var("DATABASE_URL")?;
        println!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(&database_url)
            .await?;
        Arc::new(PgStore::new(pool))
    };

    let accounts = AccountHandler::new(
        store.clone(),
        TokenService::new(b"load-test", Duration::hours(1)),
        Coins::new(1000)?,
    );
    let transfers = Arc::new(TransferHandler::new(store, TransferPolicy::default()));

    let names: Vec<String> = (0..users).map(|i| format!("testuser{}", i)).collect();
    let ctx = OperationContext::new();
    for name in &names {
        accounts
            .authenticate(AuthenticateCommand::new(name.as_str(), "password"), &ctx)
            .await?;
    }

    let supply_before = ring_supply(&accounts, &names).await?;
    println!(
        "Load Test - {} users, {} rounds, supply {}",
        users, rounds, supply_before
    );

    let start = Instant::now();
    let mut succeeded = 0u64;
    let mut rejected = 0u64;
    let mut failed = 0u64;

    for round in 0..rounds {
        let mut tasks = Vec::with_capacity(users);
        for (i, from) in names.iter().enumerate() {
            let transfers = transfers.clone();
            let command = SendCoinsCommand::new(
                from.as_str(),
                names[(i + 1) % users].as_str(),
                Coins::new(TRANSFER_AMOUNT)?,
            );
            tasks.push(tokio::spawn(async move {
                transfers.execute(command, &OperationContext::new()).await
            }));
        }

        for task in tasks {
            match task.await? {
                Ok(_) => succeeded += 1,
                Err(AppError::Domain(DomainError::InsufficientFunds { .. })) => rejected += 1,
                Err(e) => {
                    failed += 1;
                    eprintln!("Transfer failed: {}", e);
                }
            }
        }

        if (round + 1) % 10 == 0 {
            println!("Completed {} rounds...", round + 1);
        }
    }

    let elapsed = start.elapsed();
    let total = succeeded + rejected + failed;
    let rate = total as f64 / elapsed.as_secs_f64();
    let supply_after = ring_supply(&accounts, &names).await?;

    println!("\n=== Load Test Results ===");
    println!("Transfers: {}", total);
    println!("Successful: {}", succeeded);
    println!("Rejected (insufficient funds): {}", rejected);
    println!("Failed: {}", failed);
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Rate: {:.0} transfers/sec", rate);
    println!("Supply: {} -> {}", supply_before, supply_after);

    if supply_before != supply_after {
        anyhow::bail!(
            "coin supply changed: {} -> {}",
            supply_before,
            supply_after
        );
    }

    Ok(())
}

/// Sum of the balances of every user in the ring
async fn ring_supply(accounts: &AccountHandler, names: &[String]) -> Result<i64, AppError> {
    let mut total = 0;
    for name in names {
        total += accounts.user_info(name).await?.coins.value();
    }
    Ok(total)
}
