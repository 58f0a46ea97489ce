// file: src/extractor/ranker.rs
// description: bucket ordering and truncation of classified matches
// reference: internal search pipeline

use crate::config::DEFAULT_MAX_RESULTS;
use crate::models::{MatchKind, SearchMatch};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct RelevanceRanker {
    max_results: usize,
}

impl Default for RelevanceRanker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RESULTS)
    }
}

impl RelevanceRanker {
    /// The limit never exceeds `DEFAULT_MAX_RESULTS`.
    pub fn new(max_results: usize) -> Self {
        Self {
            max_results: max_results.min(DEFAULT_MAX_RESULTS),
        }
    }

    /// Exact matches first, then possible, then unclassified. Order inside a
    /// bucket is the order the matcher produced.
    pub fn rank(&self, matches: Vec<SearchMatch>) -> Vec<SearchMatch> {
        let mut exact = Vec::new();
        let mut possible = Vec::new();
        let mut other = Vec::new();

        for m in matches {
            match m.kind {
                MatchKind::Exact => exact.push(m),
                MatchKind::Possible => possible.push(m),
                MatchKind::None => other.push(m),
            }
        }

        debug!(
            "Ranking {} exact, {} possible, {} unclassified (limit {})",
            exact.len(),
            possible.len(),
            other.len(),
            self.max_results
        );

        let mut ranked = exact;
        ranked.extend(possible);
        ranked.extend(other);
        ranked.truncate(self.max_results);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CorpusPage;
    use pretty_assertions::assert_eq;

    fn result(document_id: i64, kind: MatchKind) -> SearchMatch {
        let page = CorpusPage {
            document_id,
            document_name: "x.pdf".to_string(),
            page_count: 1,
            page_id: None,
            page_number: 1,
            text: String::new(),
        };
        SearchMatch::new(&page, kind, None)
    }

    #[test]
    fn test_buckets_ordered_and_stable() {
        let input = vec![
            result(1, MatchKind::None),
            result(2, MatchKind::Possible),
            result(3, MatchKind::Exact),
            result(4, MatchKind::Possible),
            result(5, MatchKind::Exact),
        ];

        let ranked = RelevanceRanker::default().rank(input);
        let ids: Vec<i64> = ranked.iter().map(|m| m.document_id).collect();

        assert_eq!(ids, vec![3, 5, 2, 4, 1]);
    }

    #[test]
    fn test_truncates_to_limit() {
        let mut input: Vec<SearchMatch> = (0..30).map(|i| result(i, MatchKind::Possible)).collect();
        input.push(result(100, MatchKind::Exact));

        let ranked = RelevanceRanker::new(20).rank(input);

        assert_eq!(ranked.len(), 20);
        assert_eq!(ranked[0].document_id, 100);
        assert_eq!(ranked[19].document_id, 18);
    }

    #[test]
    fn test_exact_matches_never_displaced() {
        let mut input: Vec<SearchMatch> = (0..25).map(|i| result(i, MatchKind::None)).collect();
        input.extend((100..105).map(|i| result(i, MatchKind::Exact)));

        let ranked = RelevanceRanker::new(20).rank(input);
        let exact = ranked.iter().filter(|m| m.kind == MatchKind::Exact).count();
        assert_eq!(exact, 5);
    }

    #[test]
    fn test_limit_above_twenty_is_capped() {
        let input: Vec<SearchMatch> = (0..40).map(|i| result(i, MatchKind::Exact)).collect();

        let ranked = RelevanceRanker::new(50).rank(input);
        assert_eq!(ranked.len(), 20);
        assert_eq!(RelevanceRanker::new(5).rank(vec![result(1, MatchKind::None); 8]).len(), 5);
    }

    #[test]
    fn test_empty_input() {
        assert!(RelevanceRanker::default().rank(Vec::new()).is_empty());
    }
}
