// file: src/pipeline/orchestrator.rs
// description: coordinates directory scanning and concurrent pdf ingestion
// reference: orchestrates asynchronous ingestion workflow

use crate::config::IngestConfig;
use crate::error::{RepositoryError, Result};
use crate::pipeline::processor::DocumentProcessor;
use crate::pipeline::progress::{PipelineStats, ProgressTracker};
use crate::pipeline::scanner::{PdfScanner, ScannedFile};
use crate::utils::PerformanceMetrics;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

pub struct IngestOrchestrator {
    processor: Arc<DocumentProcessor>,
    config: IngestConfig,
    colored: bool,
}

impl IngestOrchestrator {
    pub fn new(processor: Arc<DocumentProcessor>, config: IngestConfig, colored: bool) -> Self {
        Self {
            processor,
            config,
            colored,
        }
    }

    /// Uploads every pdf under `root`, at most `limit` of them when given.
    pub async fn run(&self, root: &Path, limit: Option<usize>) -> Result<PipelineStats> {
        info!("Starting pdf ingest from {}", root.display());
        let started = Instant::now();

        let mut files = self.scan_files(root.to_path_buf()).await?;
        if let Some(limit) = limit {
            files.truncate(limit);
        }

        if files.is_empty() {
            warn!("No pdf files found to ingest");
            return Ok(PipelineStats::new());
        }

        let workers = self.config.parallel_workers.max(1);
        info!("Ingesting {} files with {} workers", files.len(), workers);

        let progress = Arc::new(ProgressTracker::with_color(files.len(), self.colored));

        let tasks = files.into_iter().map(|file| {
            let processor = self.processor.clone();
            let progress = progress.clone();

            async move {
                progress.set_message(file.relative_path.clone());
                match ingest_file(&processor, &file).await {
                    Ok(pages) => progress.record_document(pages, file.size),
                    Err(e) => {
                        progress.inc_files_failed();
                        warn!("Failed to ingest {}: {}", file.relative_path, e);
                    }
                }
            }
        });

        stream::iter(tasks)
            .buffer_unordered(workers)
            .collect::<Vec<()>>()
            .await;

        let stats = progress.get_stats();
        progress.finish();

        let metrics = PerformanceMetrics::new("ingest", stats.documents_created, started.elapsed());
        info!("{}", metrics.format());
        log_final_stats(&stats);

        Ok(stats)
    }

    async fn scan_files(&self, root: PathBuf) -> Result<Vec<ScannedFile>> {
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || PdfScanner::new(config).scan_directory(&root))
            .await
            .map_err(|e| RepositoryError::Io(std::io::Error::other(e.to_string())))?
    }
}

async fn ingest_file(processor: &DocumentProcessor, file: &ScannedFile) -> Result<u32> {
    let bytes = tokio::fs::read(&file.path).await?;
    let receipt = processor.upload_pdf(&file.file_name, bytes).await?;
    Ok(receipt.pages)
}

fn log_final_stats(stats: &PipelineStats) {
    info!("=== Ingest Summary ===");
    info!("Duration: {} seconds", stats.duration_secs);
    info!("Files processed: {}", stats.files_processed);
    info!("Files failed: {}", stats.files_failed);
    info!("Success rate: {:.2}%", stats.success_rate());
    info!("Pages stored: {}", stats.pages_stored);
    info!("Average pages per document: {:.1}", stats.average_pages());
    info!(
        "Processing speed: {:.2} files/sec",
        stats.files_per_second()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{DocumentQueries, SchemaManager, SqliteClient};
    use crate::parser::pdf::testing::FormFeedExtractor;
    use crate::storage::DocumentStore;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    async fn orchestrator() -> (IngestOrchestrator, SqliteClient) {
        let client = SqliteClient::in_memory().await.unwrap();
        SchemaManager::new(&client).initialize().await.unwrap();
        let processor = DocumentProcessor::new(
            client.clone(),
            Arc::new(DocumentStore::RelationalBlob),
            Arc::new(FormFeedExtractor),
        );
        let config = IngestConfig {
            parallel_workers: 2,
            skip_patterns: vec![],
            max_file_size_mb: 1,
        };
        (
            IngestOrchestrator::new(Arc::new(processor), config, false),
            client,
        )
    }

    #[tokio::test]
    async fn test_ingest_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.pdf"), "uno\u{000C}dos").unwrap();
        fs::write(dir.path().join("b.pdf"), "N° 12345").unwrap();
        fs::write(dir.path().join("vacio.pdf"), "").unwrap();
        fs::write(dir.path().join("notas.txt"), "ignorado").unwrap();

        let (orchestrator, client) = orchestrator().await;
        let stats = orchestrator.run(dir.path(), None).await.unwrap();

        assert_eq!(stats.files_processed, 2);
        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.pages_stored, 3);

        let queries = DocumentQueries::new(&client);
        assert_eq!(queries.count_documents().await.unwrap(), 2);
        assert_eq!(queries.count_all_pages().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_ingest_limit() {
        let dir = TempDir::new().unwrap();
        for name in ["a.pdf", "b.pdf", "c.pdf"] {
            fs::write(dir.path().join(name), "texto").unwrap();
        }

        let (orchestrator, client) = orchestrator().await;
        let stats = orchestrator.run(dir.path(), Some(2)).await.unwrap();

        assert_eq!(stats.documents_created, 2);
        assert_eq!(DocumentQueries::new(&client).count_documents().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        let (orchestrator, _client) = orchestrator().await;

        let stats = orchestrator.run(dir.path(), None).await.unwrap();
        assert_eq!(stats.files_processed, 0);
    }
}
