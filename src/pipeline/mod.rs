// file: src/pipeline/mod.rs
// description: document lifecycle and bulk ingest module exports
// reference: pipeline orchestration

mod orchestrator;
mod processor;
mod progress;
mod scanner;

pub use orchestrator::IngestOrchestrator;
pub use processor::{DocumentProcessor, PreUploadedDocument};
pub use progress::{PipelineStats, ProgressTracker};
pub use scanner::{PdfScanner, ScannedFile};
