// file: src/database/insert.rs
// description: transactional insertion of a document row and its page rows
// reference: https://docs.rs/sqlx

use crate::database::client::SqliteClient;
use crate::error::Result;
use crate::models::{BinaryLocation, DocumentId, NewDocument, TextLocation};
use chrono::Utc;
use tracing::{debug, info};

pub struct DocumentInserter<'a> {
    client: &'a SqliteClient,
}

impl<'a> DocumentInserter<'a> {
    pub fn new(client: &'a SqliteClient) -> Self {
        Self { client }
    }

    /// Inserts the document and, for row-backed text, one row per page.
    /// Either everything is committed or nothing is.
    pub async fn insert(&self, document: &NewDocument) -> Result<DocumentId> {
        let (ruta_archivo, contenido_pdf, s3_key) = match &document.binary {
            BinaryLocation::Path(path) => (Some(path.as_str()), None, None),
            BinaryLocation::Inline(bytes) => (None, Some(bytes.as_slice()), None),
            BinaryLocation::ObjectKey(key) => (None, None, Some(key.as_str())),
        };
        let s3_text_key = match &document.text {
            TextLocation::Rows => None,
            TextLocation::ObjectKey(key) => Some(key.as_str()),
        };

        let mut tx = self.client.pool().begin().await?;

        let result = sqlx::query(
            "INSERT INTO documentos \
             (nombre, num_paginas, fecha_subida, contenido, ruta_archivo, contenido_pdf, s3_key, s3_text_key) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&document.nombre)
        .bind(document.page_count() as i64)
        .bind(Utc::now())
        .bind(&document.contenido)
        .bind(ruta_archivo)
        .bind(contenido_pdf)
        .bind(s3_key)
        .bind(s3_text_key)
        .execute(&mut *tx)
        .await?;

        let document_id = result.last_insert_rowid();

        if document.text == TextLocation::Rows {
            for (index, text) in document.pages.iter().enumerate() {
                sqlx::query(
                    "INSERT INTO paginas_documento (documento_id, numero_pagina, contenido) \
                     VALUES (?, ?, ?)",
                )
                .bind(document_id)
                .bind(index as i64 + 1)
                .bind(text)
                .execute(&mut *tx)
                .await?;
            }
            debug!("Inserted {} page rows for document {}", document.pages.len(), document_id);
        }

        tx.commit().await?;

        info!(
            "Stored document {} ('{}', {} pages)",
            document_id,
            document.nombre,
            document.page_count()
        );
        Ok(document_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::queries::DocumentQueries;
    use crate::database::schema::SchemaManager;

    async fn setup() -> SqliteClient {
        let client = SqliteClient::in_memory().await.unwrap();
        SchemaManager::new(&client).initialize().await.unwrap();
        client
    }

    fn new_document(pages: &[&str]) -> NewDocument {
        NewDocument {
            nombre: "acta.pdf".to_string(),
            contenido: pages.join("\u{000C}"),
            pages: pages.iter().map(|p| p.to_string()).collect(),
            binary: BinaryLocation::Inline(b"%PDF-1.4".to_vec()),
            text: TextLocation::Rows,
        }
    }

    #[tokio::test]
    async fn test_insert_document_with_pages() {
        let client = setup().await;
        let id = DocumentInserter::new(&client)
            .insert(&new_document(&["uno", "dos"]))
            .await
            .unwrap();

        let queries = DocumentQueries::new(&client);
        let document = queries.get(id).await.unwrap().unwrap();
        assert_eq!(document.num_paginas, 2);
        assert!(document.has_inline_pdf);
        assert_eq!(queries.count_pages(id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_object_store_text_has_no_page_rows() {
        let client = setup().await;
        let mut document = new_document(&["uno", "dos", "tres"]);
        document.binary = BinaryLocation::ObjectKey("pdfs/a.pdf".to_string());
        document.text = TextLocation::ObjectKey("texts/a.json".to_string());

        let id = DocumentInserter::new(&client).insert(&document).await.unwrap();

        let queries = DocumentQueries::new(&client);
        let stored = queries.get(id).await.unwrap().unwrap();
        assert_eq!(stored.num_paginas, 3);
        assert_eq!(stored.s3_text_key.as_deref(), Some("texts/a.json"));
        assert_eq!(queries.count_pages(id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_page_insert_rolls_back_document() {
        let client = setup().await;
        sqlx::query("DROP TABLE paginas_documento")
            .execute(client.pool())
            .await
            .unwrap();

        let result = DocumentInserter::new(&client)
            .insert(&new_document(&["uno"]))
            .await;
        assert!(result.is_err());

        let queries = DocumentQueries::new(&client);
        assert_eq!(queries.count_documents().await.unwrap(), 0);
    }
}
