// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod corpus;
pub mod database;
pub mod error;
pub mod extractor;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod search;
pub mod server;
pub mod storage;
pub mod utils;

pub use config::{Config, DatabaseConfig, IngestConfig, SearchConfig, StorageConfig};
pub use corpus::CorpusAccessor;
pub use database::{DocumentInserter, DocumentQueries, SchemaManager, SqliteClient};
pub use error::{RepositoryError, Result};
pub use extractor::{RelevanceRanker, SerialPatterns, TwoPassMatcher};
pub use models::{Document, DocumentSummary, MatchKind, PageRecord, SearchMatch};
pub use parser::{PdfExtractor, TextExtractor};
pub use pipeline::{DocumentProcessor, IngestOrchestrator, PipelineStats};
pub use search::{PageLookup, SerialSearch};
pub use storage::DocumentStore;
pub use utils::{HealthCheck, HealthReport, HealthStatus, OperationTimer, Validator};
