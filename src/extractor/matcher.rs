// file: src/extractor/matcher.rs
// description: two-pass page pre-selection and per-page span classification
// reference: internal search pipeline

use crate::extractor::patterns::{CompiledExtractors, FoldedText, LiteralPattern, SerialPatterns};
use crate::models::{CorpusPage, MatchKind, MatchSpan, SearchMatch};
use std::collections::HashSet;
use tracing::debug;

/// Pages selected by the literal tiers, already classified.
#[derive(Debug, Default)]
pub struct MatchOutcome {
    pub matches: Vec<SearchMatch>,
    pub precise_hits: usize,
    pub permissive_hits: usize,
    pub used_permissive: bool,
}

pub struct TwoPassMatcher<'a> {
    patterns: &'a SerialPatterns,
    extractors: CompiledExtractors,
    context_window: usize,
}

impl<'a> TwoPassMatcher<'a> {
    pub fn new(patterns: &'a SerialPatterns, context_window: usize) -> Self {
        Self {
            patterns,
            extractors: patterns.compile(),
            context_window,
        }
    }

    /// Runs the precise tier over `pages`, widens to the permissive tier only
    /// when nothing was found, then classifies every selected page.
    pub fn run(&self, pages: &[CorpusPage]) -> MatchOutcome {
        let folded: Vec<FoldedText> = pages.iter().map(|p| FoldedText::new(&p.text)).collect();

        let mut selected = preselect(&folded, self.patterns.precise());
        let precise_hits = selected.len();
        let mut permissive_hits = 0;
        let used_permissive = selected.is_empty();

        if used_permissive {
            debug!(
                "No precise hits for '{}', widening to permissive patterns",
                self.patterns.serial()
            );
            let widened = preselect(&folded, self.patterns.permissive());
            permissive_hits = widened.len();

            let mut seen: HashSet<_> = selected.iter().map(|&i| pages[i].key()).collect();
            for index in widened {
                if seen.insert(pages[index].key()) {
                    selected.push(index);
                }
            }
        }

        let matches = selected
            .into_iter()
            .map(|index| self.classify(&pages[index]))
            .collect();

        MatchOutcome {
            matches,
            precise_hits,
            permissive_hits,
            used_permissive,
        }
    }

    /// Tries each prefixed pattern in order, then the general fallback.
    pub fn classify(&self, page: &CorpusPage) -> SearchMatch {
        for pattern in &self.extractors.specific {
            if let Some(found) = pattern.regex.find(&page.text) {
                debug!(
                    "Page {}/{} matched '{}' pattern",
                    page.document_id, page.page_number, pattern.label
                );
                let span = extract_span(&page.text, found.start(), found.end(), self.context_window);
                return SearchMatch::new(page, MatchKind::Exact, Some(span));
            }
        }

        if let Some(fallback) = &self.extractors.fallback
            && let Some(found) = fallback.regex.find(&page.text)
        {
            let span = extract_span(&page.text, found.start(), found.end(), self.context_window);
            return SearchMatch::new(page, MatchKind::Possible, Some(span));
        }

        SearchMatch::new(page, MatchKind::None, None)
    }
}

fn preselect(folded: &[FoldedText], patterns: &[LiteralPattern]) -> Vec<usize> {
    folded
        .iter()
        .enumerate()
        .filter(|(_, page)| patterns.iter().any(|p| p.is_found_in(page)))
        .map(|(index, _)| index)
        .collect()
}

/// Builds a span from byte offsets reported by the regex engine. Position and
/// window are measured in characters and the window is clamped to the text.
pub fn extract_span(text: &str, start: usize, end: usize, window: usize) -> MatchSpan {
    let position = text[..start].chars().count();
    let match_chars = text[start..end].chars().count();

    let context_start = char_to_byte(text, position.saturating_sub(window));
    let context_end = char_to_byte(text, position + match_chars + window);

    MatchSpan {
        text: text[start..end].to_string(),
        position,
        context: text[context_start..context_end].to_string(),
    }
}

fn char_to_byte(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}
