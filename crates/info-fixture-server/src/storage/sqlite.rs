//! SQLite storage driver

use async_trait::async_trait;
use rusqlite::{params, types::ValueRef, Connection};
use serde_json::{json, Value};
use std::sync::{Mutex, MutexGuard};

use super::{QueryRow, Storage, SEED_NAMES};
use crate::error::StorageError;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS testing (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name VARCHAR(200) NOT NULL
    );
"#;

const INSERT_SEED: &str =
    "INSERT INTO testing (name) SELECT ?1 WHERE NOT EXISTS (SELECT 1 FROM testing WHERE name = ?1)";

/// SQLite storage backed by a single connection
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Open (or create) the database at `path`; `:memory:` keeps it in RAM
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn apply_migrations(&self) -> Result<(), StorageError> {
        let mut conn = self.lock()?;
        conn.execute_batch(CREATE_TABLE)?;

        let tx = conn.transaction()?;
        for name in SEED_NAMES {
            tx.execute(INSERT_SEED, params![name])?;
        }
        tx.commit()?;
        Ok(())
    }

    async fn query(&self, sql: &str) -> Result<Vec<QueryRow>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let column_count = stmt.column_count();

        let rows = stmt.query_map([], |row| {
            (0..column_count)
                .map(|i| row.get_ref(i).map(sqlite_value_to_json))
                .collect::<rusqlite::Result<QueryRow>>()
        })?;

        let results = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(results)
    }
}

fn sqlite_value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => json!(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(s) => json!(String::from_utf8_lossy(s)),
        ValueRef::Blob(b) => json!(format!(
            "0x{}",
            b.iter().map(|byte| format!("{:02x}", byte)).collect::<String>()
        )),
    }
}
