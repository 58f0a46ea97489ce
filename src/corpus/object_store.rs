// file: src/corpus/object_store.rs
// description: corpus accessor reading per-document page-text blobs from the object store
// reference: https://docs.rs/serde_json

use crate::corpus::CorpusAccessor;
use crate::database::{DocumentQueries, SqliteClient};
use crate::error::{RepositoryError, Result};
use crate::models::{CorpusPage, Document, DocumentId, PageProbe};
use crate::storage::DocumentStore;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ObjectStoreCorpus {
    client: SqliteClient,
    store: Arc<DocumentStore>,
}

impl ObjectStoreCorpus {
    pub fn new(client: SqliteClient, store: Arc<DocumentStore>) -> Self {
        Self { client, store }
    }

    async fn load_document(&self, document: &Document) -> Result<Vec<CorpusPage>> {
        let Some(key) = &document.s3_text_key else {
            return Ok(Vec::new());
        };

        let texts = self.store.load_page_texts(key).await?;
        Ok(texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| CorpusPage {
                document_id: document.id,
                document_name: document.nombre.clone(),
                page_count: document.num_paginas,
                page_id: None,
                page_number: index as u32 + 1,
                text,
            })
            .collect())
    }

    /// Pages of every readable document plus the number of documents
    /// skipped because their text could not be read.
    async fn collect_pages(&self, documents: &[Document]) -> (Vec<CorpusPage>, usize) {
        let mut pages = Vec::new();
        let mut skipped = 0;

        for document in documents {
            match self.load_document(document).await {
                Ok(loaded) => pages.extend(loaded),
                Err(e) => {
                    skipped += 1;
                    warn!(
                        "Skipping document {} ('{}'): page text unavailable: {}",
                        document.id, document.nombre, e
                    );
                }
            }
        }

        (pages, skipped)
    }

    async fn require_document(&self, id: DocumentId) -> Result<Document> {
        DocumentQueries::new(&self.client)
            .get(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Document {} not found", id)))
    }
}

#[async_trait]
impl CorpusAccessor for ObjectStoreCorpus {
    async fn fetch_pages(&self, document: Option<DocumentId>) -> Result<Vec<CorpusPage>> {
        let documents = match document {
            Some(id) => vec![self.require_document(id).await?],
            None => DocumentQueries::new(&self.client).all().await?,
        };

        let (pages, skipped) = self.collect_pages(&documents).await;

        if skipped > 0 {
            warn!(
                "Searching without {} of {} documents whose text is unreadable",
                skipped,
                documents.len()
            );
        }
        debug!(
            "Loaded {} pages from {} object-store documents ({} skipped)",
            pages.len(),
            documents.len(),
            skipped
        );
        Ok(pages)
    }

    async fn probe_page(&self, document: DocumentId, page_number: u32) -> Result<PageProbe> {
        let stored = self.require_document(document).await?;

        let page = if page_number >= 1 && page_number <= stored.num_paginas {
            self.load_document(&stored)
                .await?
                .into_iter()
                .find(|page| page.page_number == page_number)
        } else {
            None
        };

        Ok(PageProbe {
            document: stored.summary(),
            page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{DocumentInserter, SchemaManager};
    use crate::models::{BinaryLocation, NewDocument, TextLocation};
    use crate::storage::{BlobBackend, LocalBackend, ObjectStore};
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        backend: LocalBackend,
        client: SqliteClient,
        store: Arc<DocumentStore>,
    }

    async fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let backend = LocalBackend::new(dir.path());
        let store = Arc::new(DocumentStore::ObjectStore(ObjectStore::new(
            Arc::new(backend.clone()),
            None,
            Duration::from_secs(60),
        )));
        let client = SqliteClient::in_memory().await.unwrap();
        SchemaManager::new(&client).initialize().await.unwrap();

        Fixture {
            _dir: dir,
            backend,
            client,
            store,
        }
    }

    async fn insert(fixture: &Fixture, name: &str, pages: &[&str], text_key: &str) -> DocumentId {
        DocumentInserter::new(&fixture.client)
            .insert(&NewDocument {
                nombre: name.to_string(),
                contenido: pages.join("\u{000C}"),
                pages: pages.iter().map(|p| p.to_string()).collect(),
                binary: BinaryLocation::ObjectKey(format!("pdfs/{}", name)),
                text: TextLocation::ObjectKey(text_key.to_string()),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_reads_page_blobs() {
        let fx = fixture().await;
        let TextLocation::ObjectKey(key) = fx
            .store
            .store_text("a.pdf", &["uno".to_string(), "N° 5".to_string()])
            .await
            .unwrap()
        else {
            panic!("object store must return a key");
        };
        let id = insert(&fx, "a.pdf", &["uno", "N° 5"], &key).await;

        let corpus = ObjectStoreCorpus::new(fx.client.clone(), fx.store.clone());
        let pages = corpus.fetch_pages(None).await.unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].key(), (id, 2));
        assert_eq!(pages[1].text, "N° 5");
        assert_eq!(pages[1].page_id, None);

        let probe = corpus.probe_page(id, 2).await.unwrap();
        assert_eq!(probe.page.unwrap().text, "N° 5");
        assert!(corpus.probe_page(id, 3).await.unwrap().page.is_none());
    }

    #[tokio::test]
    async fn test_unreadable_documents_are_skipped() {
        let fx = fixture().await;
        fx.backend
            .put("texts/good.json", br#"["bueno"]"#.to_vec())
            .await
            .unwrap();
        fx.backend
            .put("texts/broken.json", b"{not json".to_vec())
            .await
            .unwrap();

        insert(&fx, "missing.pdf", &["x"], "texts/missing.json").await;
        let good = insert(&fx, "good.pdf", &["bueno"], "texts/good.json").await;
        insert(&fx, "broken.pdf", &["y"], "texts/broken.json").await;

        let corpus = ObjectStoreCorpus::new(fx.client.clone(), fx.store.clone());
        let pages = corpus.fetch_pages(None).await.unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].document_id, good);

        let documents = DocumentQueries::new(&fx.client).all().await.unwrap();
        let (pages, skipped) = corpus.collect_pages(&documents).await;
        assert_eq!(pages.len(), 1);
        assert_eq!(skipped, 2);
    }

    #[tokio::test]
    async fn test_missing_document_is_not_found() {
        let fx = fixture().await;
        let corpus = ObjectStoreCorpus::new(fx.client.clone(), fx.store.clone());

        assert!(matches!(
            corpus.fetch_pages(Some(42)).await,
            Err(RepositoryError::NotFound(_))
        ));
        assert!(matches!(
            corpus.probe_page(42, 1).await,
            Err(RepositoryError::NotFound(_))
        ));
    }
}
