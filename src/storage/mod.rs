// file: src/storage/mod.rs
// description: document artifact storage across local, relational-blob and object-store backends
// reference: internal module structure

pub mod backend;
pub mod signing;

pub use backend::{BlobBackend, LocalBackend, S3Backend};
pub use signing::PresignedUrlGenerator;

use crate::config::{StorageBackendKind, StorageConfig};
use crate::database::DocumentQueries;
use crate::error::{RepositoryError, Result};
use crate::models::{BinaryLocation, Document, TextLocation};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// How a stored PDF is handed back to a viewer.
#[derive(Debug, Clone, PartialEq)]
pub enum OpenedBinary {
    Bytes(Vec<u8>),
    /// Short-lived url the client should be redirected to.
    Redirect(String),
}

/// Presigned upload target returned to clients that push PDFs straight to the bucket.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SignedUpload {
    #[serde(rename = "uploadURL")]
    pub url: String,
    #[serde(rename = "s3Key")]
    pub key: String,
    #[serde(rename = "expiresIn")]
    pub expires_in: u64,
}

pub struct ObjectStore {
    backend: Arc<dyn BlobBackend>,
    presigner: Option<PresignedUrlGenerator>,
    url_expiry: Duration,
}

impl ObjectStore {
    pub fn new(
        backend: Arc<dyn BlobBackend>,
        presigner: Option<PresignedUrlGenerator>,
        url_expiry: Duration,
    ) -> Self {
        Self {
            backend,
            presigner,
            url_expiry,
        }
    }
}

pub enum DocumentStore {
    /// PDF on local disk, page text in rows.
    Local(LocalBackend),
    /// PDF in the `contenido_pdf` column, page text in rows.
    RelationalBlob,
    /// PDF and page-text JSON in a bucket.
    ObjectStore(ObjectStore),
}

impl DocumentStore {
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let store = match config.backend {
            StorageBackendKind::Local => {
                DocumentStore::Local(LocalBackend::new(config.upload_dir.clone()))
            }
            StorageBackendKind::RelationalBlob => DocumentStore::RelationalBlob,
            StorageBackendKind::ObjectStore => {
                let settings = config.object_store.as_ref().ok_or_else(|| {
                    RepositoryError::Config("object store settings are missing".to_string())
                })?;
                DocumentStore::ObjectStore(ObjectStore::new(
                    Arc::new(S3Backend::new(settings)?),
                    Some(PresignedUrlGenerator::new(settings)),
                    Duration::from_secs(settings.url_expiry_secs),
                ))
            }
        };

        info!("Using {:?} document storage", store.kind());
        Ok(store)
    }

    pub fn kind(&self) -> StorageBackendKind {
        match self {
            DocumentStore::Local(_) => StorageBackendKind::Local,
            DocumentStore::RelationalBlob => StorageBackendKind::RelationalBlob,
            DocumentStore::ObjectStore(_) => StorageBackendKind::ObjectStore,
        }
    }

    pub async fn store_binary(&self, file_name: &str, bytes: Vec<u8>) -> Result<BinaryLocation> {
        match self {
            DocumentStore::Local(backend) => {
                let key = storage_key(file_name);
                backend.put(&key, bytes).await?;
                Ok(BinaryLocation::Path(key))
            }
            DocumentStore::RelationalBlob => Ok(BinaryLocation::Inline(bytes)),
            DocumentStore::ObjectStore(store) => {
                let key = format!("pdfs/{}", storage_key(file_name));
                store.backend.put(&key, bytes).await?;
                Ok(BinaryLocation::ObjectKey(key))
            }
        }
    }

    /// Page text goes to rows unless the store keeps it as a JSON blob.
    pub async fn store_text(&self, file_name: &str, pages: &[String]) -> Result<TextLocation> {
        match self {
            DocumentStore::ObjectStore(store) => {
                let key = format!("texts/{}.json", storage_key(file_name));
                store.backend.put(&key, serde_json::to_vec(pages)?).await?;
                Ok(TextLocation::ObjectKey(key))
            }
            _ => Ok(TextLocation::Rows),
        }
    }

    /// Reads the page-text JSON stored under `key`.
    pub async fn load_page_texts(&self, key: &str) -> Result<Vec<String>> {
        match self {
            DocumentStore::ObjectStore(store) => {
                let bytes = store.backend.get(key).await?;
                Ok(serde_json::from_slice(&bytes)?)
            }
            _ => Err(RepositoryError::InvalidInput(
                "page text blobs exist only in the object store".to_string(),
            )),
        }
    }

    /// Removes the binary and text artifacts that live outside the database.
    /// Every key is attempted; failures are logged and reported together.
    pub async fn remove_artifacts(&self, document: &Document) -> Result<()> {
        let (backend, keys): (&dyn BlobBackend, Vec<&String>) = match self {
            DocumentStore::Local(backend) => (
                backend as &dyn BlobBackend,
                document.ruta_archivo.iter().collect(),
            ),
            DocumentStore::RelationalBlob => return Ok(()),
            DocumentStore::ObjectStore(store) => (
                store.backend.as_ref(),
                [&document.s3_key, &document.s3_text_key]
                    .into_iter()
                    .flatten()
                    .collect(),
            ),
        };

        let mut failed = Vec::new();
        for key in keys {
            if let Err(e) = backend.delete(key).await {
                warn!(
                    "Could not remove artifact {} of document {}: {}",
                    key, document.id, e
                );
                failed.push(key.as_str());
            }
        }

        if !failed.is_empty() {
            return Err(RepositoryError::Storage(format!(
                "failed to remove {} of document {}",
                failed.join(", "),
                document.id
            )));
        }

        debug!("Removed artifacts of document {}", document.id);
        Ok(())
    }

    pub async fn open_binary(
        &self,
        document: &Document,
        queries: &DocumentQueries<'_>,
    ) -> Result<OpenedBinary> {
        let missing = || RepositoryError::NotFound(format!("PDF of document {} not found", document.id));

        match self {
            DocumentStore::Local(backend) => {
                let path = document.ruta_archivo.as_deref().ok_or_else(missing)?;
                Ok(OpenedBinary::Bytes(backend.get(path).await?))
            }
            DocumentStore::RelationalBlob => {
                let bytes = queries.fetch_blob(document.id).await?.ok_or_else(missing)?;
                Ok(OpenedBinary::Bytes(bytes))
            }
            DocumentStore::ObjectStore(store) => {
                let key = document.s3_key.as_deref().ok_or_else(missing)?;
                match &store.presigner {
                    Some(signer) => Ok(OpenedBinary::Redirect(
                        signer.presign_get(key, store.url_expiry)?,
                    )),
                    None => Ok(OpenedBinary::Bytes(store.backend.get(key).await?)),
                }
            }
        }
    }

    pub fn signed_upload_url(&self, file_name: &str) -> Result<SignedUpload> {
        let DocumentStore::ObjectStore(store) = self else {
            return Err(RepositoryError::InvalidInput(
                "Signed upload urls require the object_store backend".to_string(),
            ));
        };
        let signer = store.presigner.as_ref().ok_or_else(|| {
            RepositoryError::Config("object store has no signing credentials".to_string())
        })?;

        let key = format!("pdfs/{}", storage_key(file_name));
        let url = signer.presign_put(&key, store.url_expiry)?;

        Ok(SignedUpload {
            url,
            key,
            expires_in: store.url_expiry.as_secs(),
        })
    }
}

/// Unique key for an uploaded file, keeping a readable tail.
pub fn storage_key(file_name: &str) -> String {
    let tail: String = file_name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let tail = tail.trim_start_matches('.');

    format!("{}-{}", Uuid::new_v4(), if tail.is_empty() { "document.pdf" } else { tail })
}
