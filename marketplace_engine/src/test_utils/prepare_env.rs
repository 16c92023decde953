use log::*;
use sqlx::migrate;

use crate::{db::sqlite, SqliteDatabase};

/// Creates a throwaway database at `url` and brings it up to the latest schema. Call once at the top of each
/// integration test.
pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    sqlite::create_database(url).await.expect("Error creating database");
    run_migrations(url).await;
}

/// A unique file-backed database path under the system temp directory. File-backed rather than in-memory so that
/// every pooled connection sees the same data.
pub fn random_db_path() -> String {
    format!("sqlite://{}/marketplace_test_{}.db", std::env::temp_dir().display(), rand::random::<u64>())
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    migrate!("./src/db/sqlite/migrations").run(db.pool()).await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
}
