// file: src/database/schema.rs
// description: SQLite schema management for documents and page rows
// reference: https://www.sqlite.org/foreignkeys.html

use crate::database::client::SqliteClient;
use crate::error::Result;
use tracing::{info, warn};

pub const DOCUMENTS_TABLE: &str = "documentos";
pub const PAGES_TABLE: &str = "paginas_documento";

const CREATE_STATEMENTS: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS documentos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        nombre TEXT NOT NULL,
        num_paginas INTEGER NOT NULL,
        fecha_subida TEXT NOT NULL,
        contenido TEXT NOT NULL DEFAULT '',
        ruta_archivo TEXT,
        contenido_pdf BLOB,
        s3_key TEXT,
        s3_text_key TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS paginas_documento (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        documento_id INTEGER NOT NULL REFERENCES documentos(id) ON DELETE CASCADE,
        numero_pagina INTEGER NOT NULL,
        contenido TEXT NOT NULL,
        UNIQUE (documento_id, numero_pagina)
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_paginas_documento_documento
        ON paginas_documento (documento_id)
    "#,
];

pub struct SchemaManager<'a> {
    client: &'a SqliteClient,
}

impl<'a> SchemaManager<'a> {
    pub fn new(client: &'a SqliteClient) -> Self {
        Self { client }
    }

    pub async fn initialize(&self) -> Result<()> {
        info!("Initializing SQLite schema");

        for statement in CREATE_STATEMENTS {
            sqlx::query(statement).execute(self.client.pool()).await?;
        }

        info!("SQLite schema initialized successfully");
        Ok(())
    }

    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(table_name)
        .fetch_one(self.client.pool())
        .await?;

        Ok(count > 0)
    }

    pub async fn verify_schema(&self) -> Result<bool> {
        for table_name in [DOCUMENTS_TABLE, PAGES_TABLE] {
            if !self.table_exists(table_name).await? {
                warn!("Table '{}' does not exist", table_name);
                return Ok(false);
            }
            info!("Table '{}' exists", table_name);
        }

        Ok(true)
    }

    pub async fn drop_all_tables(&self) -> Result<()> {
        warn!("Dropping all tables in SQLite");

        // Children first so the foreign key never dangles.
        for table_name in [PAGES_TABLE, DOCUMENTS_TABLE] {
            sqlx::query(&format!("DROP TABLE IF EXISTS {}", table_name))
                .execute(self.client.pool())
                .await?;
            info!("Dropped table: {}", table_name);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let client = SqliteClient::in_memory().await.unwrap();
        let schema = SchemaManager::new(&client);

        assert!(!schema.verify_schema().await.unwrap());
        schema.initialize().await.unwrap();
        schema.initialize().await.unwrap();
        assert!(schema.verify_schema().await.unwrap());
    }

    #[tokio::test]
    async fn test_drop_all_tables() {
        let client = SqliteClient::in_memory().await.unwrap();
        let schema = SchemaManager::new(&client);

        schema.initialize().await.unwrap();
        schema.drop_all_tables().await.unwrap();

        assert!(!schema.table_exists(DOCUMENTS_TABLE).await.unwrap());
        assert!(!schema.table_exists(PAGES_TABLE).await.unwrap());
    }
}
