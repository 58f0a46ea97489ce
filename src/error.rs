// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RepositoryError>;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Page {requested} does not exist; document {document_id} has {page_count} pages")]
    PageOutOfRange {
        document_id: i64,
        requested: u32,
        page_count: u32,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Text extraction error: {0}")]
    Extraction(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RepositoryError {
    /// True for failures of a backend (database, storage, extraction) as
    /// opposed to a problem with the caller's request.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            RepositoryError::Database(_)
                | RepositoryError::Storage(_)
                | RepositoryError::Extraction(_)
                | RepositoryError::Io(_)
                | RepositoryError::Serialization(_)
                | RepositoryError::Config(_)
        )
    }
}
