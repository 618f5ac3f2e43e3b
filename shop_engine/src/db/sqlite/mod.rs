pub mod db;
mod errors;

pub mod inventory;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod users;

use std::{env, str::FromStr, time::Duration};

pub use db::SqliteDatabase;
pub use errors::SqliteDatabaseError;
use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

const SQLITE_DB_URL: &str = "sqlite://data/shop_store.db";
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

pub fn db_url() -> String {
    let result = env::var("SHOP_DATABASE_URL").unwrap_or_else(|_| {
        info!("SHOP_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

/// Creates a new connection pool.
///
/// Writers that find the database locked wait for up to [`BUSY_TIMEOUT`] rather than failing immediately, which is
/// what lets concurrent checkouts queue up behind each other.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqliteDatabaseError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}
