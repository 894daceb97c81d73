//! Application configuration

use std::env;
use std::fmt;

use crate::error::ConfigError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP listener binds to
    pub host: String,

    /// Port the HTTP listener binds to
    pub port: u16,

    /// Which database driver to open and how to reach it
    pub storage: StorageConfig,
}

/// Database driver selection
#[derive(Debug, Clone, PartialEq)]
pub enum StorageConfig {
    Postgres(PostgresConfig),
    Sqlite { path: String },
}

/// PostgreSQL connection parameters
#[derive(Clone, PartialEq)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl PostgresConfig {
    /// Connection URL without the password, for logs
    pub fn display_url(&self) -> String {
        format!(
            "postgres://{}@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }
}

impl fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("APP_PORT") {
            Some(raw) => parse_port("APP_PORT", &raw)?,
            None => 5000,
        };

        let storage = match lookup("APP_STORAGE").as_deref().unwrap_or("postgres") {
            "postgres" => StorageConfig::Postgres(PostgresConfig {
                host: required(&lookup, "APP_POSTGRES_HOST")?,
                port: parse_port("APP_POSTGRES_PORT", &required(&lookup, "APP_POSTGRES_PORT")?)?,
                user: required(&lookup, "APP_POSTGRES_USER")?,
                password: required(&lookup, "APP_POSTGRES_PASS")?,
                database: required(&lookup, "APP_POSTGRES_DB")?,
            }),
            "sqlite" => StorageConfig::Sqlite {
                path: lookup("APP_SQLITE_PATH").unwrap_or_else(|| ":memory:".to_string()),
            },
            other => return Err(ConfigError::UnknownStorage(other.to_string())),
        };

        Ok(Self { host, port, storage })
    }

    /// Socket address for the HTTP listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).ok_or(ConfigError::Missing(key))
}

fn parse_port(key: &'static str, raw: &str) -> Result<u16, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidPort {
        key,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn postgres_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            ("APP_POSTGRES_HOST", "db"),
            ("APP_POSTGRES_PORT", "5432"),
            ("APP_POSTGRES_USER", "app"),
            ("APP_POSTGRES_PASS", "s3cret"),
            ("APP_POSTGRES_DB", "fixtures"),
        ]
    }

    #[test]
    fn test_postgres_is_default_storage() {
        let config = AppConfig::from_lookup(lookup_from(&postgres_vars())).unwrap();

        assert_eq!(config.listen_addr(), "0.0.0.0:5000");
        match config.storage {
            StorageConfig::Postgres(pg) => {
                assert_eq!(pg.host, "db");
                assert_eq!(pg.port, 5432);
                assert_eq!(pg.database, "fixtures");
            }
            other => panic!("expected postgres, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_postgres_variable() {
        let vars: Vec<_> = postgres_vars()
            .into_iter()
            .filter(|(k, _)| *k != "APP_POSTGRES_PASS")
            .collect();

        let err = AppConfig::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("APP_POSTGRES_PASS")));
    }

    #[test]
    fn test_sqlite_needs_no_postgres_variables() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("APP_STORAGE", "sqlite"),
            ("APP_PORT", "8099"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8099);
        assert_eq!(
            config.storage,
            StorageConfig::Sqlite { path: ":memory:".to_string() }
        );
    }

    #[test]
    fn test_invalid_port_and_unknown_storage() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("APP_STORAGE", "sqlite"),
            ("APP_PORT", "http"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { key: "APP_PORT", .. }));

        let err = AppConfig::from_lookup(lookup_from(&[("APP_STORAGE", "mongo")])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownStorage(ref s) if s == "mongo"));
    }

    #[test]
    fn test_password_is_never_printed() {
        let config = AppConfig::from_lookup(lookup_from(&postgres_vars())).unwrap();
        let StorageConfig::Postgres(pg) = &config.storage else {
            panic!("expected postgres");
        };

        assert!(!format!("{:?}", config).contains("s3cret"));
        assert_eq!(pg.display_url(), "postgres://app@db:5432/fixtures");
        assert_eq!(pg.password, "s3cret");
    }
}
