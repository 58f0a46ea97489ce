// file: src/search/page_lookup.rs
// description: direct lookup of one page's text by document id and page number

use crate::corpus::CorpusAccessor;
use crate::error::{RepositoryError, Result};
use crate::models::{DocumentId, PageRecord};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct PageLookup {
    corpus: Arc<dyn CorpusAccessor>,
}

impl PageLookup {
    pub fn new(corpus: Arc<dyn CorpusAccessor>) -> Self {
        Self { corpus }
    }

    /// `page_number` is 1-based.
    pub async fn get_page(&self, document: DocumentId, page_number: u32) -> Result<PageRecord> {
        if page_number == 0 {
            return Err(RepositoryError::InvalidInput(
                "Page numbers start at 1".to_string(),
            ));
        }

        let probe = self.corpus.probe_page(document, page_number).await?;

        if page_number > probe.document.num_paginas {
            return Err(RepositoryError::PageOutOfRange {
                document_id: document,
                requested: page_number,
                page_count: probe.document.num_paginas,
            });
        }

        let page = probe.page.ok_or_else(|| {
            RepositoryError::NotFound(format!(
                "Page {} of document {} has no stored text",
                page_number, document
            ))
        })?;

        debug!("Loaded page {} of document {}", page_number, document);
        Ok(PageRecord::from(page))
    }
}
