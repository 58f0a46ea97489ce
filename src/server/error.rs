// file: src/server/error.rs
// description: maps repository errors onto http responses
// reference: https://docs.rs/axum/latest/axum/response/trait.IntoResponse.html

use crate::error::RepositoryError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

fn status_for(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        RepositoryError::NotFound(_) | RepositoryError::PageOutOfRange { .. } => {
            StatusCode::NOT_FOUND
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Client-facing message. Upstream failures are logged and replaced by
/// `fallback` so backend details never leak.
fn message_for(err: &RepositoryError, fallback: &str) -> String {
    if err.is_upstream() {
        error!("{}: {}", fallback, err);
        fallback.to_string()
    } else {
        err.to_string()
    }
}

/// Error for JSON api routes, rendered as `{"error": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn from_repository(err: RepositoryError, fallback: &str) -> Self {
        Self::new(status_for(&err), message_for(&err, fallback))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        Self::from_repository(err, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Error for document-viewing routes, rendered as plain text.
#[derive(Debug)]
pub struct ViewError {
    status: StatusCode,
    message: String,
}

impl From<RepositoryError> for ViewError {
    fn from(err: RepositoryError) -> Self {
        Self {
            status: status_for(&err),
            message: message_for(&err, "Could not load the PDF"),
        }
    }
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(RepositoryError::InvalidInput("x".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(RepositoryError::PageOutOfRange {
                document_id: 1,
                requested: 4,
                page_count: 2
            })
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(RepositoryError::Storage("down".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_detail_hidden() {
        let err = ApiError::from_repository(
            RepositoryError::Storage("secret endpoint".to_string()),
            "Upload failed",
        );
        assert_eq!(err.message, "Upload failed");

        let err = ApiError::from(RepositoryError::NotFound("Document 3".to_string()));
        assert_eq!(err.message, "Not found: Document 3");
    }
}
