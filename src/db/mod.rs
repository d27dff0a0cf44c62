//! Local database initialization and migration runner.
//!
//! SYSTEM CONTEXT
//! ==============
//! Startup uses this module to open the on-disk SQLite file that backs the
//! local store and to bring its schema up to the current version before any
//! queue or favorite operation runs.
//!
//! DESIGN
//! ======
//! Migrations are additive only: each one creates what is missing and never
//! drops or rewrites an existing collection, so upgrading keeps queued
//! submissions and favorites intact.

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 1;

/// Open (creating if missing) the SQLite database and run migrations.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrations fail.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

/// Apply all pending schema migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("src/db/migrations").run(pool).await?;
    Ok(())
}

/// Current schema version (highest applied migration).
///
/// # Errors
///
/// Returns an error if the migrations table cannot be read.
pub async fn schema_version(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let version: Option<i64> =
        sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success = 1").fetch_one(pool).await?;
    Ok(version.unwrap_or(0))
}


#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
