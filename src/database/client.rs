// file: src/database/client.rs
// description: SQLite pool wrapper with connection management
// reference: https://docs.rs/sqlx

use crate::config::DatabaseConfig;
use crate::error::{RepositoryError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

#[derive(Clone)]
pub struct SqliteClient {
    pool: SqlitePool,
    config: DatabaseConfig,
}

impl SqliteClient {
    pub async fn new(config: DatabaseConfig) -> Result<Self> {
        info!("Connecting to SQLite at {}", config.uri);

        let in_memory = is_in_memory(&config.uri);
        if !in_memory {
            ensure_parent_dir(&config.uri)?;
        }

        let options = SqliteConnectOptions::from_str(&config.uri)
            .map_err(|e| RepositoryError::Config(format!("Invalid database uri: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        // A private in-memory database lives only as long as its connection.
        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .connect_with(options)
                .await?
        };

        Ok(Self { pool, config })
    }

    /// Fresh private database, mostly for tests and dry runs.
    pub async fn in_memory() -> Result<Self> {
        Self::new(DatabaseConfig {
            uri: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
        .await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn uri(&self) -> &str {
        &self.config.uri
    }

    pub async fn ping(&self) -> Result<bool> {
        debug!("Checking SQLite connection");

        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::Database)?;

        Ok(true)
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("SQLite pool closed");
    }
}

fn is_in_memory(uri: &str) -> bool {
    uri.contains(":memory:") || uri.contains("mode=memory")
}

fn ensure_parent_dir(uri: &str) -> Result<()> {
    let path = uri
        .strip_prefix("sqlite://")
        .or_else(|| uri.strip_prefix("sqlite:"))
        .unwrap_or(uri);
    let path = path.split('?').next().unwrap_or(path);

    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    Ok(())
}
