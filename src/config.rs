// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{RepositoryError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_RESULTS: usize = 20;
pub const DEFAULT_CONTEXT_WINDOW: usize = 150;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub search: SearchConfig,
    pub ingest: IngestConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub uri: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackendKind {
    Local,
    RelationalBlob,
    ObjectStore,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub backend: StorageBackendKind,
    pub upload_dir: PathBuf,
    #[serde(default)]
    pub object_store: Option<ObjectStoreConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObjectStoreConfig {
    pub endpoint: String,
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default = "default_url_expiry")]
    pub url_expiry_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_context_window")]
    pub context_window: usize,
    #[serde(default)]
    pub not_found_on_empty: bool,
    #[serde(default)]
    pub normalize_input: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestConfig {
    pub parallel_workers: usize,
    pub skip_patterns: Vec<String>,
    pub max_file_size_mb: usize,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_url_expiry() -> u64 {
    60
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

fn default_context_window() -> usize {
    DEFAULT_CONTEXT_WINDOW
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            context_window: DEFAULT_CONTEXT_WINDOW,
            not_found_on_empty: false,
            normalize_input: false,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("SERIAL_VAULT")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| RepositoryError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| RepositoryError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                max_upload_mb: 50,
            },
            database: DatabaseConfig {
                uri: "sqlite://data/documents.db".to_string(),
                max_connections: 10,
            },
            storage: StorageConfig {
                backend: StorageBackendKind::Local,
                upload_dir: PathBuf::from("./uploads"),
                object_store: None,
            },
            search: SearchConfig::default(),
            ingest: IngestConfig {
                parallel_workers: 4,
                skip_patterns: vec![".git/*".to_string(), "*.tmp.pdf".to_string()],
                max_file_size_mb: 50,
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.ingest.parallel_workers == 0 {
            return Err(RepositoryError::Config(
                "parallel_workers must be greater than 0".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(RepositoryError::Config(
                "max_connections must be greater than 0".to_string(),
            ));
        }

        if self.server.max_upload_mb == 0 {
            return Err(RepositoryError::Config(
                "max_upload_mb must be greater than 0".to_string(),
            ));
        }

        if self.search.max_results == 0 || self.search.max_results > DEFAULT_MAX_RESULTS {
            return Err(RepositoryError::Config(format!(
                "search.max_results must be between 1 and {}",
                DEFAULT_MAX_RESULTS
            )));
        }

        if self.storage.backend == StorageBackendKind::ObjectStore {
            let store = self.storage.object_store.as_ref().ok_or_else(|| {
                RepositoryError::Config(
                    "storage.object_store section is required for the object_store backend"
                        .to_string(),
                )
            })?;

            if store.endpoint.is_empty() || store.bucket.is_empty() {
                return Err(RepositoryError::Config(
                    "object store endpoint and bucket must be set".to_string(),
                ));
            }

            if store.access_key_id.is_empty() || store.secret_access_key.is_empty() {
                return Err(RepositoryError::Config(
                    "object store credentials must be set".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.server.max_upload_mb * 1024 * 1024
    }
}
