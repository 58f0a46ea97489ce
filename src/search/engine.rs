// file: src/search/engine.rs
// description: serial search orchestration over a corpus accessor
// reference: internal search pipeline

use crate::config::SearchConfig;
use crate::corpus::CorpusAccessor;
use crate::error::{RepositoryError, Result};
use crate::extractor::{RelevanceRanker, SerialPatterns, TwoPassMatcher};
use crate::models::{DocumentId, SearchMatch};
use crate::utils::OperationTimer;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const SLOW_SEARCH: Duration = Duration::from_secs(2);

#[derive(Clone)]
pub struct SerialSearch {
    corpus: Arc<dyn CorpusAccessor>,
    config: SearchConfig,
}

impl SerialSearch {
    pub fn new(corpus: Arc<dyn CorpusAccessor>, config: SearchConfig) -> Self {
        Self { corpus, config }
    }

    /// Finds pages mentioning `serial`, optionally inside one document, and
    /// returns at most `max_results` ranked matches.
    pub async fn search(
        &self,
        serial: &str,
        document: Option<DocumentId>,
    ) -> Result<Vec<SearchMatch>> {
        let patterns = SerialPatterns::with_normalization(serial, self.config.normalize_input)?;
        let timer = OperationTimer::new(&format!("serial search '{}'", patterns.serial()));

        let pages = self.corpus.fetch_pages(document).await?;
        let outcome = TwoPassMatcher::new(&patterns, self.config.context_window).run(&pages);

        info!(
            "Serial '{}': {} pages scanned, {} precise hits, {} permissive hits",
            patterns.serial(),
            pages.len(),
            outcome.precise_hits,
            outcome.permissive_hits
        );

        let ranked = RelevanceRanker::new(self.config.max_results).rank(outcome.matches);

        timer.warn_if_slow(SLOW_SEARCH);
        timer.finish_with_count(ranked.len());

        if ranked.is_empty() && self.config.not_found_on_empty {
            return Err(RepositoryError::NotFound(format!(
                "No pages mention serial {}",
                patterns.serial()
            )));
        }

        Ok(ranked)
    }
}
