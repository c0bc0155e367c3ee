//! Database module
//!
//! Database connection and schema checks. The schema itself lives in the SQL
//! files under `migrations/`.

use sqlx::PgPool;

/// Tables the store reads and writes
const REQUIRED_TABLES: &[&str] = &["users", "transactions", "items", "inventory"];

/// Simple connectivity check
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    for table in REQUIRED_TABLES {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    // An empty catalog is legal but makes every purchase fail
    let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
        .fetch_one(pool)
        .await?;
    if items == 0 {
        tracing::warn!("Item catalog is empty. Please run database seed.");
    } else {
        tracing::info!(items, "Item catalog loaded");
    }

    Ok(true)
}
