//! PostgreSQL storage driver

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio_postgres::{types::Type, Client, NoTls, Row};

use super::{QueryRow, Storage, SEED_NAMES};
use crate::config::PostgresConfig;
use crate::error::StorageError;

const CREATE_TABLE: &str =
    "CREATE TABLE IF NOT EXISTS testing (id SERIAL PRIMARY KEY, name VARCHAR(200) NOT NULL)";

const INSERT_SEED: &str = "INSERT INTO testing (name) SELECT $1::varchar \
     WHERE NOT EXISTS (SELECT 1 FROM testing WHERE name = $1::varchar)";

/// PostgreSQL storage backed by a single client connection
pub struct PostgresStorage {
    client: Client,
}

impl PostgresStorage {
    /// Connect and spawn the connection task on the current runtime
    pub async fn connect(config: &PostgresConfig) -> Result<Self, StorageError> {
        let (client, connection) = tokio_postgres::Config::new()
            .host(&config.host)
            .port(config.port)
            .user(&config.user)
            .password(&config.password)
            .dbname(&config.database)
            .connect(NoTls)
            .await?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection closed: {}", e);
            }
        });

        tracing::info!("Connected to {}", config.display_url());
        Ok(Self { client })
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn apply_migrations(&self) -> Result<(), StorageError> {
        self.client.batch_execute(CREATE_TABLE).await?;

        let insert = self.client.prepare(INSERT_SEED).await?;
        for name in SEED_NAMES {
            self.client.execute(&insert, &[&name]).await?;
        }
        Ok(())
    }

    async fn query(&self, sql: &str) -> Result<Vec<QueryRow>, StorageError> {
        let rows = self.client.query(sql, &[]).await?;
        rows.iter().map(pg_row_values).collect()
    }
}

fn pg_row_values(row: &Row) -> Result<QueryRow, StorageError> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, col)| {
            let ty = col.type_();
            let value = match *ty {
                Type::BOOL => row.try_get::<_, Option<bool>>(idx).map(|v| json!(v)),
                Type::INT2 => row.try_get::<_, Option<i16>>(idx).map(|v| json!(v)),
                Type::INT4 => row.try_get::<_, Option<i32>>(idx).map(|v| json!(v)),
                Type::INT8 => row.try_get::<_, Option<i64>>(idx).map(|v| json!(v)),
                Type::FLOAT4 => row
                    .try_get::<_, Option<f32>>(idx)
                    .map(|v| float_to_json(v.map(f64::from))),
                Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx).map(float_to_json),
                _ => row.try_get::<_, Option<String>>(idx).map(|v| json!(v)),
            };

            value.map_err(|_| StorageError::UnsupportedColumn {
                column: col.name().to_string(),
                type_name: ty.name().to_string(),
            })
        })
        .collect()
}

fn float_to_json(value: Option<f64>) -> Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
