// file: src/pipeline/progress.rs
// description: progress bars and statistics for bulk pdf ingestion
// reference: https://docs.rs/indicatif

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub documents_created: usize,
    pub pages_stored: u64,
    pub total_bytes_processed: u64,
    pub duration_secs: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files_per_second(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        self.files_processed as f64 / self.duration_secs as f64
    }

    pub fn average_pages(&self) -> f64 {
        if self.documents_created == 0 {
            return 0.0;
        }
        self.pages_stored as f64 / self.documents_created as f64
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.files_processed + self.files_failed;
        if total == 0 {
            return 0.0;
        }
        (self.files_processed as f64 / total as f64) * 100.0
    }
}

pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    files_processed: Arc<AtomicUsize>,
    files_failed: Arc<AtomicUsize>,
    documents_created: Arc<AtomicUsize>,
    pages_stored: Arc<AtomicU64>,
    bytes_processed: Arc<AtomicU64>,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new(total_files: usize) -> Self {
        Self::with_color(total_files, true)
    }

    pub fn with_color(total_files: usize, colored: bool) -> Self {
        let multi_progress = MultiProgress::new();

        let main_bar = create_progress_bar(&multi_progress, total_files as u64, colored);
        let detail_bar = create_detail_bar(&multi_progress);

        Self {
            main_bar,
            detail_bar,
            files_processed: Arc::new(AtomicUsize::new(0)),
            files_failed: Arc::new(AtomicUsize::new(0)),
            documents_created: Arc::new(AtomicUsize::new(0)),
            pages_stored: Arc::new(AtomicU64::new(0)),
            bytes_processed: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    /// Counts a stored document of `pages` pages read from `bytes` bytes.
    pub fn record_document(&self, pages: u32, bytes: u64) {
        self.files_processed.fetch_add(1, Ordering::SeqCst);
        self.documents_created.fetch_add(1, Ordering::SeqCst);
        self.pages_stored.fetch_add(pages as u64, Ordering::SeqCst);
        self.bytes_processed.fetch_add(bytes, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn inc_files_failed(&self) {
        self.files_failed.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn set_message(&self, message: String) {
        self.main_bar.set_message(message);
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("Ingest complete");
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> PipelineStats {
        PipelineStats {
            files_processed: self.files_processed.load(Ordering::SeqCst),
            files_failed: self.files_failed.load(Ordering::SeqCst),
            documents_created: self.documents_created.load(Ordering::SeqCst),
            pages_stored: self.pages_stored.load(Ordering::SeqCst),
            total_bytes_processed: self.bytes_processed.load(Ordering::SeqCst),
            duration_secs: self.start_time.elapsed().as_secs(),
        }
    }

    fn update_detail_bar(&self) {
        let message = format!(
            "Documents: {} | Pages: {} | Failed: {}",
            self.documents_created.load(Ordering::SeqCst),
            self.pages_stored.load(Ordering::SeqCst),
            self.files_failed.load(Ordering::SeqCst)
        );
        self.detail_bar.set_message(message);
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    let (template, chars) = if colored {
        (
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            "█▓▒░",
        )
    } else {
        (
            "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({eta}) {msg}",
            "=>-",
        )
    };

    bar.set_style(
        ProgressStyle::default_bar()
            .template(template)
            .expect("Failed to create progress bar template")
            .progress_chars(chars),
    );
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg}")
            .expect("Failed to create detail bar template"),
    );
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_stats_calculations() {
        let stats = PipelineStats {
            files_processed: 9,
            files_failed: 1,
            documents_created: 9,
            pages_stored: 27,
            total_bytes_processed: 1000,
            duration_secs: 3,
        };

        assert_eq!(stats.files_per_second(), 3.0);
        assert_eq!(stats.average_pages(), 3.0);
        assert!((stats.success_rate() - 90.0).abs() < 0.01);
    }

    #[test]
    fn test_pipeline_stats_empty() {
        let stats = PipelineStats::new();
        assert_eq!(stats.files_per_second(), 0.0);
        assert_eq!(stats.average_pages(), 0.0);
        assert_eq!(stats.success_rate(), 0.0);
    }

    #[test]
    fn test_tracker_counts() {
        let tracker = ProgressTracker::with_color(3, false);

        tracker.record_document(4, 1024);
        tracker.record_document(1, 10);
        tracker.inc_files_failed();

        let stats = tracker.get_stats();
        assert_eq!(stats.files_processed, 2);
        assert_eq!(stats.documents_created, 2);
        assert_eq!(stats.pages_stored, 5);
        assert_eq!(stats.total_bytes_processed, 1034);
        assert_eq!(stats.files_failed, 1);
    }
}
