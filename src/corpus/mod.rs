// file: src/corpus/mod.rs
// description: searchable page-text corpus over the configured storage backend
// reference: internal module structure

pub mod object_store;
pub mod relational;

pub use object_store::ObjectStoreCorpus;
pub use relational::RelationalCorpus;

use crate::database::SqliteClient;
use crate::error::Result;
use crate::models::{CorpusPage, DocumentId, PageProbe};
use crate::storage::DocumentStore;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait CorpusAccessor: Send + Sync {
    /// Pages ordered by document id, then page number. With `document` set
    /// only that document is read and a missing document is `NotFound`.
    async fn fetch_pages(&self, document: Option<DocumentId>) -> Result<Vec<CorpusPage>>;

    /// The document summary plus the requested page if it is stored.
    async fn probe_page(&self, document: DocumentId, page_number: u32) -> Result<PageProbe>;
}

/// Picks the accessor matching where page text lives.
pub fn for_store(client: SqliteClient, store: Arc<DocumentStore>) -> Arc<dyn CorpusAccessor> {
    match store.as_ref() {
        DocumentStore::ObjectStore(_) => Arc::new(ObjectStoreCorpus::new(client, store)),
        _ => Arc::new(RelationalCorpus::new(client)),
    }
}
