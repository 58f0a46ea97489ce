// file: src/storage/backend.rs
// description: blob backends for pdf binaries and page-text artifacts
// reference: https://docs.rs/async-trait

use crate::config::ObjectStoreConfig;
use crate::error::{RepositoryError, Result};
use crate::storage::signing::PresignedUrlGenerator;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, warn};

/// Key/value store for opaque blobs.
#[async_trait]
pub trait BlobBackend: Send + Sync {
    async fn put(&self, key: &str, data: Vec<u8>) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Stores blobs as files under a base directory.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    base_path: PathBuf,
}

impl LocalBackend {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn full_path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !is_plain {
            return Err(RepositoryError::InvalidInput(format!(
                "Invalid storage key: {}",
                key
            )));
        }

        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl BlobBackend for LocalBackend {
    async fn put(&self, key: &str, data: Vec<u8>) -> Result<()> {
        let full_path = self.full_path(key)?;
        debug!("Writing {} bytes to {}", data.len(), full_path.display());

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write then rename so readers never see a partial file.
        let temp_path = full_path.with_extension("partial");
        fs::write(&temp_path, &data).await?;
        fs::rename(&temp_path, &full_path).await?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let full_path = self.full_path(key)?;
        match fs::read(&full_path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(RepositoryError::NotFound(
                format!("Stored file {} not found", key),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let full_path = self.full_path(key)?;
        if fs::try_exists(&full_path).await? {
            fs::remove_file(&full_path).await?;
        }
        Ok(())
    }
}

/// S3-compatible object store reached through presigned urls.
pub struct S3Backend {
    http: reqwest::Client,
    signer: PresignedUrlGenerator,
}

const REQUEST_EXPIRY: Duration = Duration::from_secs(300);

impl S3Backend {
    pub fn new(config: &ObjectStoreConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| RepositoryError::Storage(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            signer: PresignedUrlGenerator::new(config),
        })
    }
}

#[async_trait]
impl BlobBackend for S3Backend {
    async fn put(&self, key: &str, data: Vec<u8>) -> Result<()> {
        let url = self.signer.presign_put(key, REQUEST_EXPIRY)?;
        debug!("Uploading {} bytes to object {}", data.len(), key);

        self.http
            .put(&url)
            .body(data)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| RepositoryError::Storage(format!("Upload of {} failed: {}", key, e)))?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let url = self.signer.presign_get(key, REQUEST_EXPIRY)?;

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| RepositoryError::Storage(format!("Fetch of {} failed: {}", key, e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RepositoryError::NotFound(format!("Object {} not found", key)));
        }

        let bytes = response
            .error_for_status()
            .map_err(|e| RepositoryError::Storage(format!("Fetch of {} failed: {}", key, e)))?
            .bytes()
            .await
            .map_err(|e| RepositoryError::Storage(format!("Reading {} failed: {}", key, e)))?;

        Ok(bytes.to_vec())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let url = self.signer.presign_delete(key, REQUEST_EXPIRY)?;

        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| RepositoryError::Storage(format!("Delete of {} failed: {}", key, e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            warn!("Object {} was already gone", key);
            return Ok(());
        }

        response
            .error_for_status()
            .map_err(|e| RepositoryError::Storage(format!("Delete of {} failed: {}", key, e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_put_get_delete() {
        let dir = TempDir::new().unwrap();
        let backend = LocalBackend::new(dir.path());

        backend.put("pdfs/a.pdf", b"%PDF".to_vec()).await.unwrap();
        assert_eq!(backend.get("pdfs/a.pdf").await.unwrap(), b"%PDF".to_vec());

        backend.delete("pdfs/a.pdf").await.unwrap();
        assert!(matches!(
            backend.get("pdfs/a.pdf").await,
            Err(RepositoryError::NotFound(_))
        ));

        // Second delete is a no-op.
        backend.delete("pdfs/a.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn test_local_rejects_escaping_keys() {
        let dir = TempDir::new().unwrap();
        let backend = LocalBackend::new(dir.path());

        for key in ["../outside.pdf", "/etc/passwd", "", "a/../../b"] {
            assert!(
                matches!(
                    backend.put(key, vec![1]).await,
                    Err(RepositoryError::InvalidInput(_))
                ),
                "key {key:?}"
            );
        }
    }
}
