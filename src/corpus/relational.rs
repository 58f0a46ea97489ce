// file: src/corpus/relational.rs
// description: corpus accessor joining document rows with page rows
// reference: https://docs.rs/sqlx

use crate::corpus::CorpusAccessor;
use crate::database::SqliteClient;
use crate::database::queries::summary_from_row;
use crate::error::{RepositoryError, Result};
use crate::models::{CorpusPage, DocumentId, PageProbe};
use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use tracing::debug;

const PAGE_SELECT: &str = "SELECT d.id, d.nombre, d.num_paginas, p.id AS pagina_id, \
     p.numero_pagina, p.contenido \
     FROM paginas_documento p JOIN documentos d ON d.id = p.documento_id";

pub struct RelationalCorpus {
    client: SqliteClient,
}

impl RelationalCorpus {
    pub fn new(client: SqliteClient) -> Self {
        Self { client }
    }

    async fn document_exists(&self, id: DocumentId) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM documentos WHERE id = ?")
            .bind(id)
            .fetch_optional(self.client.pool())
            .await?;
        Ok(found.is_some())
    }
}

#[async_trait]
impl CorpusAccessor for RelationalCorpus {
    async fn fetch_pages(&self, document: Option<DocumentId>) -> Result<Vec<CorpusPage>> {
        let rows = match document {
            Some(id) => {
                if !self.document_exists(id).await? {
                    return Err(RepositoryError::NotFound(format!("Document {} not found", id)));
                }
                sqlx::query(&format!(
                    "{} WHERE d.id = ? ORDER BY p.numero_pagina",
                    PAGE_SELECT
                ))
                .bind(id)
                .fetch_all(self.client.pool())
                .await?
            }
            None => {
                sqlx::query(&format!("{} ORDER BY d.id, p.numero_pagina", PAGE_SELECT))
                    .fetch_all(self.client.pool())
                    .await?
            }
        };

        debug!("Loaded {} page rows", rows.len());
        rows.iter().map(page_from_row).collect()
    }

    async fn probe_page(&self, document: DocumentId, page_number: u32) -> Result<PageProbe> {
        let summary = sqlx::query(
            "SELECT id, nombre, num_paginas, fecha_subida FROM documentos WHERE id = ?",
        )
        .bind(document)
        .fetch_optional(self.client.pool())
        .await?
        .as_ref()
        .map(summary_from_row)
        .transpose()?
        .ok_or_else(|| RepositoryError::NotFound(format!("Document {} not found", document)))?;

        let page = sqlx::query(&format!(
            "{} WHERE d.id = ? AND p.numero_pagina = ?",
            PAGE_SELECT
        ))
        .bind(document)
        .bind(page_number as i64)
        .fetch_optional(self.client.pool())
        .await?
        .as_ref()
        .map(page_from_row)
        .transpose()?;

        Ok(PageProbe {
            document: summary,
            page,
        })
    }
}

fn page_from_row(row: &SqliteRow) -> Result<CorpusPage> {
    Ok(CorpusPage {
        document_id: row.try_get("id")?,
        document_name: row.try_get("nombre")?,
        page_count: row.try_get::<i64, _>("num_paginas")? as u32,
        page_id: Some(row.try_get("pagina_id")?),
        page_number: row.try_get::<i64, _>("numero_pagina")? as u32,
        text: row.try_get("contenido")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{DocumentInserter, SchemaManager};
    use crate::models::{BinaryLocation, NewDocument, TextLocation};
    use pretty_assertions::assert_eq;

    async fn seeded() -> (SqliteClient, DocumentId, DocumentId) {
        let client = SqliteClient::in_memory().await.unwrap();
        SchemaManager::new(&client).initialize().await.unwrap();

        let inserter = DocumentInserter::new(&client);
        let mut ids = Vec::new();
        for (name, pages) in [("a.pdf", vec!["a1", "a2"]), ("b.pdf", vec!["b1"])] {
            let id = inserter
                .insert(&NewDocument {
                    nombre: name.to_string(),
                    contenido: pages.join("\u{000C}"),
                    pages: pages.iter().map(|p| p.to_string()).collect(),
                    binary: BinaryLocation::Inline(vec![0]),
                    text: TextLocation::Rows,
                })
                .await
                .unwrap();
            ids.push(id);
        }

        (client, ids[0], ids[1])
    }

    #[tokio::test]
    async fn test_fetch_all_pages_in_order() {
        let (client, a, b) = seeded().await;
        let corpus = RelationalCorpus::new(client);

        let pages = corpus.fetch_pages(None).await.unwrap();
        let keys: Vec<(DocumentId, u32)> = pages.iter().map(|p| p.key()).collect();

        assert_eq!(keys, vec![(a, 1), (a, 2), (b, 1)]);
        assert_eq!(pages[1].text, "a2");
        assert_eq!(pages[1].page_count, 2);
        assert!(pages[0].page_id.is_some());
    }

    #[tokio::test]
    async fn test_fetch_scoped_to_document() {
        let (client, _, b) = seeded().await;
        let corpus = RelationalCorpus::new(client);

        let pages = corpus.fetch_pages(Some(b)).await.unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].document_name, "b.pdf");

        assert!(matches!(
            corpus.fetch_pages(Some(999)).await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_probe_page() {
        let (client, a, _) = seeded().await;
        let corpus = RelationalCorpus::new(client);

        let probe = corpus.probe_page(a, 2).await.unwrap();
        assert_eq!(probe.document.num_paginas, 2);
        assert_eq!(probe.page.unwrap().text, "a2");

        let missing_page = corpus.probe_page(a, 5).await.unwrap();
        assert!(missing_page.page.is_none());

        assert!(matches!(
            corpus.probe_page(999, 1).await,
            Err(RepositoryError::NotFound(_))
        ));
    }
}
