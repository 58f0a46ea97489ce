// file: src/database/queries.rs
// description: read and delete operations over the documents tables
// reference: https://docs.rs/sqlx

use crate::database::client::SqliteClient;
use crate::error::{RepositoryError, Result};
use crate::models::{Document, DocumentId, DocumentSummary};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use tracing::info;

const DOCUMENT_COLUMNS: &str = "id, nombre, num_paginas, fecha_subida, ruta_archivo, s3_key, \
     s3_text_key, contenido_pdf IS NOT NULL AS has_inline_pdf";

pub struct DocumentQueries<'a> {
    client: &'a SqliteClient,
}

impl<'a> DocumentQueries<'a> {
    pub fn new(client: &'a SqliteClient) -> Self {
        Self { client }
    }

    /// Newest uploads first.
    pub async fn list(&self) -> Result<Vec<DocumentSummary>> {
        let rows = sqlx::query(
            "SELECT id, nombre, num_paginas, fecha_subida FROM documentos \
             ORDER BY fecha_subida DESC, id DESC",
        )
        .fetch_all(self.client.pool())
        .await?;

        rows.iter().map(summary_from_row).collect()
    }

    pub async fn get(&self, id: DocumentId) -> Result<Option<Document>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM documentos WHERE id = ?",
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.client.pool())
        .await?;

        row.as_ref().map(document_from_row).transpose()
    }

    /// Every stored document, ascending by id.
    pub async fn all(&self) -> Result<Vec<Document>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM documentos ORDER BY id",
            DOCUMENT_COLUMNS
        ))
        .fetch_all(self.client.pool())
        .await?;

        rows.iter().map(document_from_row).collect()
    }

    /// Bytes kept in the `contenido_pdf` column, if any.
    pub async fn fetch_blob(&self, id: DocumentId) -> Result<Option<Vec<u8>>> {
        let blob: Option<Option<Vec<u8>>> =
            sqlx::query_scalar("SELECT contenido_pdf FROM documentos WHERE id = ?")
                .bind(id)
                .fetch_optional(self.client.pool())
                .await?;

        Ok(blob.flatten())
    }

    /// Removes the document row and its page rows in one transaction and
    /// returns what was deleted so the caller can clean up artifacts.
    pub async fn delete(&self, id: DocumentId) -> Result<Document> {
        let mut tx = self.client.pool().begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {} FROM documentos WHERE id = ?",
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let document = match row {
            Some(row) => document_from_row(&row)?,
            None => {
                return Err(RepositoryError::NotFound(format!(
                    "Document {} not found",
                    id
                )));
            }
        };

        sqlx::query("DELETE FROM paginas_documento WHERE documento_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM documentos WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Deleted document {} ('{}')", id, document.nombre);
        Ok(document)
    }

    pub async fn count_documents(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documentos")
            .fetch_one(self.client.pool())
            .await?;
        Ok(count as u64)
    }

    pub async fn count_pages(&self, id: DocumentId) -> Result<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM paginas_documento WHERE documento_id = ?")
                .bind(id)
                .fetch_one(self.client.pool())
                .await?;
        Ok(count as u64)
    }

    pub async fn count_all_pages(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM paginas_documento")
            .fetch_one(self.client.pool())
            .await?;
        Ok(count as u64)
    }
}

pub(crate) fn summary_from_row(row: &SqliteRow) -> Result<DocumentSummary> {
    Ok(DocumentSummary {
        id: row.try_get("id")?,
        nombre: row.try_get("nombre")?,
        num_paginas: row.try_get::<i64, _>("num_paginas")? as u32,
        fecha_subida: row.try_get("fecha_subida")?,
    })
}

fn document_from_row(row: &SqliteRow) -> Result<Document> {
    Ok(Document {
        id: row.try_get("id")?,
        nombre: row.try_get("nombre")?,
        num_paginas: row.try_get::<i64, _>("num_paginas")? as u32,
        fecha_subida: row.try_get("fecha_subida")?,
        ruta_archivo: row.try_get("ruta_archivo")?,
        s3_key: row.try_get("s3_key")?,
        s3_text_key: row.try_get("s3_text_key")?,
        has_inline_pdf: row.try_get("has_inline_pdf")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::insert::DocumentInserter;
    use crate::database::schema::SchemaManager;
    use crate::models::{BinaryLocation, NewDocument, TextLocation};
    use pretty_assertions::assert_eq;

    async fn setup() -> SqliteClient {
        let client = SqliteClient::in_memory().await.unwrap();
        SchemaManager::new(&client).initialize().await.unwrap();
        client
    }

    async fn insert(client: &SqliteClient, nombre: &str, binary: BinaryLocation) -> DocumentId {
        DocumentInserter::new(client)
            .insert(&NewDocument {
                nombre: nombre.to_string(),
                contenido: "a\u{000C}b".to_string(),
                pages: vec!["a".to_string(), "b".to_string()],
                binary,
                text: TextLocation::Rows,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let client = setup().await;
        let first = insert(&client, "uno.pdf", BinaryLocation::Inline(vec![1])).await;
        let second = insert(&client, "dos.pdf", BinaryLocation::Inline(vec![2])).await;

        let listed = DocumentQueries::new(&client).list().await.unwrap();
        let ids: Vec<DocumentId> = listed.iter().map(|d| d.id).collect();

        assert_eq!(ids, vec![second, first]);
        assert_eq!(listed[0].num_paginas, 2);
    }

    #[tokio::test]
    async fn test_fetch_blob() {
        let client = setup().await;
        let inline = insert(&client, "a.pdf", BinaryLocation::Inline(vec![9, 8, 7])).await;
        let on_disk = insert(&client, "b.pdf", BinaryLocation::Path("b.pdf".to_string())).await;

        let queries = DocumentQueries::new(&client);
        assert_eq!(queries.fetch_blob(inline).await.unwrap(), Some(vec![9, 8, 7]));
        assert_eq!(queries.fetch_blob(on_disk).await.unwrap(), None);
        assert_eq!(queries.fetch_blob(404).await.unwrap(), None);

        let stored = queries.get(on_disk).await.unwrap().unwrap();
        assert_eq!(stored.ruta_archivo.as_deref(), Some("b.pdf"));
        assert!(!stored.has_inline_pdf);
    }

    #[tokio::test]
    async fn test_delete_removes_pages() {
        let client = setup().await;
        let id = insert(&client, "a.pdf", BinaryLocation::Inline(vec![1])).await;
        let queries = DocumentQueries::new(&client);

        let deleted = queries.delete(id).await.unwrap();
        assert_eq!(deleted.id, id);
        assert!(queries.get(id).await.unwrap().is_none());
        assert_eq!(queries.count_pages(id).await.unwrap(), 0);
        assert_eq!(queries.count_all_pages().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_missing_document() {
        let client = setup().await;
        let result = DocumentQueries::new(&client).delete(12).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }
}
