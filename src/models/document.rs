// file: src/models/document.rs
// description: document metadata models shared by storage, database and api layers
// reference: internal data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type DocumentId = i64;

/// Listing row returned by `GET /documentos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub nombre: String,
    pub num_paginas: u32,
    pub fecha_subida: DateTime<Utc>,
}

/// Where the original PDF bytes live for a stored document.
#[derive(Debug, Clone, PartialEq)]
pub enum BinaryLocation {
    /// Key under the local upload directory.
    Path(String),
    /// Bytes kept in the `contenido_pdf` column.
    Inline(Vec<u8>),
    ObjectKey(String),
}

/// Where the per-page text lives for a stored document.
#[derive(Debug, Clone, PartialEq)]
pub enum TextLocation {
    /// One row per page in `paginas_documento`.
    Rows,
    /// JSON array of page strings in the object store.
    ObjectKey(String),
}

/// A fully stored document, as read back from the `documentos` table.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: DocumentId,
    pub nombre: String,
    pub num_paginas: u32,
    pub fecha_subida: DateTime<Utc>,
    pub ruta_archivo: Option<String>,
    pub s3_key: Option<String>,
    pub s3_text_key: Option<String>,
    pub has_inline_pdf: bool,
}

impl Document {
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id,
            nombre: self.nombre.clone(),
            num_paginas: self.num_paginas,
            fecha_subida: self.fecha_subida,
        }
    }

    /// File name used in `Content-Disposition` headers.
    pub fn download_name(&self) -> String {
        let stem = self
            .nombre
            .strip_suffix(".pdf")
            .unwrap_or(&self.nombre)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");
        format!("{}.pdf", stem)
    }
}

/// Everything needed to insert a document and its pages in one transaction.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub nombre: String,
    pub contenido: String,
    pub pages: Vec<String>,
    pub binary: BinaryLocation,
    pub text: TextLocation,
}

impl NewDocument {
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }
}

/// Response body of a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadReceipt {
    pub success: bool,
    pub message: String,
    #[serde(rename = "documentId")]
    pub document_id: DocumentId,
    #[serde(rename = "fileName")]
    pub file_name: String,
    pub pages: u32,
}

impl UploadReceipt {
    pub fn new(document_id: DocumentId, file_name: String, pages: u32) -> Self {
        Self {
            success: true,
            message: "File uploaded and processed".to_string(),
            document_id,
            file_name,
            pages,
        }
    }
}
