//! Storage drivers
//!
//! A single database connection that seeds the `testing` table at startup
//! and answers ad-hoc read queries:
//! - PostgreSQL - the default, reached over TCP
//! - SQLite - embedded, for local runs and tests

mod postgres;
mod sqlite;

pub use postgres::PostgresStorage;
pub use sqlite::SqliteStorage;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::config::StorageConfig;
use crate::error::StorageError;

/// Query served by `/info/`
pub const INFO_QUERY: &str = "SELECT id, name FROM testing LIMIT 2";

/// Names inserted into `testing`, in id order
pub const SEED_NAMES: [&str; 3] = ["golang", "gonkey", "testing"];

/// One result row, columns in select order
pub type QueryRow = Vec<Value>;

/// Common interface over the database drivers
#[async_trait]
pub trait Storage: Send + Sync {
    /// Driver name for logs
    fn backend(&self) -> &'static str;

    /// Create the `testing` table and insert any missing seed rows.
    ///
    /// Safe to run on every startup: existing seed rows are left alone.
    async fn apply_migrations(&self) -> Result<(), StorageError>;

    /// Run a read query and return every row
    async fn query(&self, sql: &str) -> Result<Vec<QueryRow>, StorageError>;
}

/// Open the driver selected in configuration
pub async fn connect(config: &StorageConfig) -> Result<Arc<dyn Storage>, StorageError> {
    let storage: Arc<dyn Storage> = match config {
        StorageConfig::Postgres(pg) => Arc::new(PostgresStorage::connect(pg).await?),
        StorageConfig::Sqlite { path } => Arc::new(SqliteStorage::open(path)?),
    };
    Ok(storage)
}
