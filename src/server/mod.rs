// file: src/server/mod.rs
// description: http router, shared state and server lifecycle
// reference: https://docs.rs/axum

pub mod error;
pub mod handlers;
pub mod views;

use crate::config::{Config, SearchConfig};
use crate::corpus;
use crate::database::{SchemaManager, SqliteClient};
use crate::error::Result;
use crate::parser::{PdfExtractor, TextExtractor};
use crate::pipeline::DocumentProcessor;
use crate::search::{PageLookup, SerialSearch};
use crate::storage::DocumentStore;
use axum::extract::{DefaultBodyLimit, Extension};
use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub struct AppState {
    pub client: SqliteClient,
    pub store: Arc<DocumentStore>,
    pub processor: DocumentProcessor,
    pub search: SerialSearch,
    pub pages: PageLookup,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        client: SqliteClient,
        store: Arc<DocumentStore>,
        extractor: Arc<dyn TextExtractor>,
        search: SearchConfig,
        max_upload_bytes: usize,
    ) -> Self {
        let corpus = corpus::for_store(client.clone(), store.clone());

        Self {
            processor: DocumentProcessor::new(client.clone(), store.clone(), extractor),
            search: SerialSearch::new(corpus.clone(), search),
            pages: PageLookup::new(corpus),
            client,
            store,
            max_upload_bytes,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_upload_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/", get(handlers::index))
        .route("/documentos", get(handlers::list_documents))
        .route("/documentos/:id", delete(handlers::delete_document))
        .route("/upload", post(handlers::upload))
        .route("/buscar", get(handlers::search_redirect))
        .route("/buscar/serial", get(handlers::search_serial))
        .route("/buscar/pagina", get(handlers::search_page))
        .route("/ver-pdf/:id", get(handlers::view_pdf))
        .route("/ver-pdf-directo/:id/:pagina", get(handlers::view_pdf_page))
        .route("/s3-signed-url", get(handlers::signed_upload_url))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(Extension(state))
}

/// Opens the pool, ensures the schema, serves until Ctrl+C, then closes the pool.
pub async fn serve(config: &Config) -> Result<()> {
    let client = SqliteClient::new(config.database.clone()).await?;
    SchemaManager::new(&client).initialize().await?;

    let store = Arc::new(DocumentStore::from_config(&config.storage)?);
    let state = Arc::new(AppState::new(
        client.clone(),
        store,
        Arc::new(PdfExtractor::new()),
        config.search.clone(),
        config.max_upload_bytes(),
    ));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on http://{}", addr);

    let served = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    client.close().await;
    info!("Server stopped");

    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
