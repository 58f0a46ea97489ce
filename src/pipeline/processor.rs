// file: src/pipeline/processor.rs
// description: document lifecycle: upload with extraction, pre-uploaded registration, deletion
// reference: stores artifacts through the document store and rows through sqlx

use crate::database::{DocumentInserter, DocumentQueries, SqliteClient};
use crate::error::{RepositoryError, Result};
use crate::models::{
    BinaryLocation, Document, DocumentId, DocumentSummary, NewDocument, TextLocation,
    UploadReceipt,
};
use crate::parser::{ExtractedText, TextExtractor};
use crate::storage::DocumentStore;
use crate::utils::Validator;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// JSON body describing a PDF the client already pushed to the bucket.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreUploadedDocument {
    pub s3_key: String,
    pub originalname: String,
    pub num_paginas: u32,
    #[serde(default)]
    pub contenido_completo: Option<String>,
    #[serde(default)]
    pub s3_text_key: Option<String>,
    #[serde(default)]
    pub paginas_contenido: Option<Vec<String>>,
}

#[derive(Clone)]
pub struct DocumentProcessor {
    client: SqliteClient,
    store: Arc<DocumentStore>,
    extractor: Arc<dyn TextExtractor>,
}

impl DocumentProcessor {
    pub fn new(
        client: SqliteClient,
        store: Arc<DocumentStore>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            client,
            store,
            extractor,
        }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Extracts page text from `bytes`, stores the artifacts and inserts the
    /// document with its pages.
    pub async fn upload_pdf(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadReceipt> {
        let nombre = Validator::sanitize_file_name(file_name);
        info!("Processing upload: {} ({} bytes)", nombre, bytes.len());

        let extractor = self.extractor.clone();
        let (bytes, extracted) = tokio::task::spawn_blocking(move || {
            let extracted = extractor.extract(&bytes);
            (bytes, extracted)
        })
        .await
        .map_err(|e| RepositoryError::Extraction(format!("Extraction task failed: {}", e)))?;
        let extracted = extracted?;

        let binary = self.store.store_binary(&nombre, bytes).await?;
        let text = self.store.store_text(&nombre, &extracted.pages).await?;

        self.insert(nombre, extracted, binary, text).await
    }

    /// Records a PDF that already lives in the object store.
    pub async fn register_object(&self, upload: PreUploadedDocument) -> Result<UploadReceipt> {
        if !matches!(self.store.as_ref(), DocumentStore::ObjectStore(_)) {
            return Err(RepositoryError::InvalidInput(
                "Pre-uploaded documents require the object_store backend".to_string(),
            ));
        }

        if upload.s3_key.trim().is_empty() {
            return Err(RepositoryError::InvalidInput("s3Key is required".to_string()));
        }

        if upload.num_paginas == 0 {
            return Err(RepositoryError::InvalidInput(
                "numPaginas must be greater than 0".to_string(),
            ));
        }

        let nombre = Validator::sanitize_file_name(&upload.originalname);
        let (extracted, text) = self.resolve_texts(&nombre, &upload).await?;

        self.insert(
            nombre,
            extracted,
            BinaryLocation::ObjectKey(upload.s3_key),
            text,
        )
        .await
    }

    async fn resolve_texts(
        &self,
        nombre: &str,
        upload: &PreUploadedDocument,
    ) -> Result<(ExtractedText, TextLocation)> {
        let expected = upload.num_paginas;

        if let Some(pages) = &upload.paginas_contenido {
            let extracted = ExtractedText::new(pages.clone());
            check_page_count(&extracted, expected, "paginasContenido")?;
            let text = self.store.store_text(nombre, &extracted.pages).await?;
            return Ok((extracted, text));
        }

        if let Some(key) = &upload.s3_text_key {
            let extracted = ExtractedText::new(self.store.load_page_texts(key).await?);
            check_page_count(&extracted, expected, "s3TextKey")?;
            return Ok((extracted, TextLocation::ObjectKey(key.clone())));
        }

        if let Some(full_text) = &upload.contenido_completo {
            let extracted = ExtractedText::from_full_text(full_text);
            check_page_count(&extracted, expected, "contenidoCompleto")?;
            let text = self.store.store_text(nombre, &extracted.pages).await?;
            return Ok((extracted, text));
        }

        Err(RepositoryError::InvalidInput(
            "Page texts are required: paginasContenido, s3TextKey or contenidoCompleto"
                .to_string(),
        ))
    }

    async fn insert(
        &self,
        nombre: String,
        extracted: ExtractedText,
        binary: BinaryLocation,
        text: TextLocation,
    ) -> Result<UploadReceipt> {
        let document = NewDocument {
            contenido: extracted.full_text(),
            pages: extracted.pages,
            nombre,
            binary,
            text,
        };

        match DocumentInserter::new(&self.client).insert(&document).await {
            Ok(id) => {
                info!(
                    "Stored document {} as id {} ({} pages)",
                    document.nombre,
                    id,
                    document.page_count()
                );
                Ok(UploadReceipt::new(
                    id,
                    document.nombre.clone(),
                    document.page_count(),
                ))
            }
            Err(e) => {
                warn!(
                    "Insert of {} failed; stored artifacts are orphaned ({:?}, {:?})",
                    document.nombre,
                    orphan_label(&document.binary),
                    document.text
                );
                Err(e)
            }
        }
    }

    /// Deletes the document rows, then removes external artifacts. Artifact
    /// failures are logged and do not undo the delete.
    pub async fn delete(&self, id: DocumentId) -> Result<Document> {
        let document = DocumentQueries::new(&self.client).delete(id).await?;

        if let Err(e) = self.store.remove_artifacts(&document).await {
            warn!("Document {} deleted but artifacts remain: {}", id, e);
        }

        info!("Deleted document {} ({})", id, document.nombre);
        Ok(document)
    }

    pub async fn list(&self) -> Result<Vec<DocumentSummary>> {
        DocumentQueries::new(&self.client).list().await
    }
}

fn check_page_count(extracted: &ExtractedText, expected: u32, source: &str) -> Result<()> {
    if extracted.num_pages() != expected {
        return Err(RepositoryError::InvalidInput(format!(
            "{} has {} pages but numPaginas is {}",
            source,
            extracted.num_pages(),
            expected
        )));
    }
    Ok(())
}

fn orphan_label(binary: &BinaryLocation) -> &str {
    match binary {
        BinaryLocation::Path(key) | BinaryLocation::ObjectKey(key) => key,
        BinaryLocation::Inline(_) => "inline",
    }
}
