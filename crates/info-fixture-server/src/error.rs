//! Error types for the fixture server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors raised while reading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid port in {key}: {value:?}")]
    InvalidPort { key: &'static str, value: String },

    #[error("unknown storage backend {0:?} (expected \"postgres\" or \"sqlite\")")]
    UnknownStorage(String),
}

/// Errors raised by a storage driver
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("unsupported column type {type_name} in column {column}")]
    UnsupportedColumn { column: String, type_name: String },

    #[error("database connection lock poisoned")]
    Poisoned,
}

/// Errors surfaced to HTTP clients
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!("Request failed: {}", self);
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
