use std::{env, str::FromStr, time::Duration};

use log::*;
use mpb_common::parse_boolean_flag;
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Sqlite,
    SqlitePool,
};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/marketplace.db";

/// The database URL, from `MPB_DATABASE_URL`, falling back to a local file.
pub fn db_url() -> String {
    env::var("MPB_DATABASE_URL").unwrap_or_else(|_| {
        warn!("🗃️ MPB_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}");
        DEFAULT_DATABASE_URL.to_string()
    })
}

/// Creates a new connection pool against the given URL.
///
/// WAL journaling and a busy timeout are configured so that concurrent writers queue behind SQLite's single-writer
/// lock instead of surfacing spurious busy errors. `MPB_DB_CREATE_IF_MISSING` (default: true) controls whether a
/// missing database file is created.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let create_if_missing = parse_boolean_flag(env::var("MPB_DB_CREATE_IF_MISSING").ok(), true);
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(create_if_missing)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));
    SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await
}

/// Drops and recreates the database at the given URL. Intended for test environments.
pub async fn create_database(url: &str) -> Result<(), sqlx::Error> {
    if let Err(e) = Sqlite::drop_database(url).await {
        warn!("🗃️ Error dropping database {url}: {e:?}");
    }
    Sqlite::create_database(url).await?;
    info!("🗃️ Created Sqlite database {url}");
    Ok(())
}
