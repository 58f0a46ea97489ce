// file: src/models/page.rs
// description: page-level text records produced by the corpus accessors
// reference: internal data structures

use crate::models::document::{DocumentId, DocumentSummary};
use serde::{Deserialize, Serialize};

/// One page of searchable text together with its owning document.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusPage {
    pub document_id: DocumentId,
    pub document_name: String,
    pub page_count: u32,
    /// Row id of the page; `None` when the text came from an object-store blob.
    pub page_id: Option<i64>,
    pub page_number: u32,
    pub text: String,
}

impl CorpusPage {
    /// Identity used to de-duplicate pages across matcher passes.
    pub fn key(&self) -> (DocumentId, u32) {
        (self.document_id, self.page_number)
    }
}

/// Result of asking a corpus for a single page.
#[derive(Debug, Clone)]
pub struct PageProbe {
    pub document: DocumentSummary,
    pub page: Option<CorpusPage>,
}

/// Response body of `GET /buscar/pagina`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: DocumentId,
    pub nombre: String,
    pub num_paginas: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagina_id: Option<i64>,
    pub numero_pagina: u32,
    pub contenido: String,
}

impl From<CorpusPage> for PageRecord {
    fn from(page: CorpusPage) -> Self {
        Self {
            id: page.document_id,
            nombre: page.document_name,
            num_paginas: page.page_count,
            pagina_id: page.page_id,
            numero_pagina: page.page_number,
            contenido: page.text,
        }
    }
}
