// file: src/parser/pdf.rs
// description: per-page text extraction from uploaded pdf bytes
// reference: https://docs.rs/lopdf

use crate::error::{RepositoryError, Result};
use lopdf::Document;
use tracing::{debug, warn};

/// Separator between pages in the concatenated document text.
pub const PAGE_SEPARATOR: char = '\u{000C}';

/// Page texts in page order. Index 0 is page 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedText {
    pub pages: Vec<String>,
}

impl ExtractedText {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }

    pub fn num_pages(&self) -> u32 {
        self.pages.len() as u32
    }

    pub fn full_text(&self) -> String {
        self.pages.join(&PAGE_SEPARATOR.to_string())
    }

    /// Splits a concatenated text on the page separator.
    pub fn from_full_text(text: &str) -> Self {
        Self::new(text.split(PAGE_SEPARATOR).map(str::to_string).collect())
    }
}

/// Turns a PDF into per-page text. Implementations must be cheap to share
/// across upload tasks.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText> {
        let doc = Document::load_mem(bytes)
            .map_err(|e| RepositoryError::Extraction(format!("Failed to load PDF: {}", e)))?;

        let mut page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        page_numbers.sort_unstable();

        if page_numbers.is_empty() {
            return Err(RepositoryError::Extraction(
                "PDF contains no pages".to_string(),
            ));
        }

        let pages = page_numbers
            .iter()
            .map(|&number| match doc.extract_text(&[number]) {
                Ok(text) => text.trim().to_string(),
                Err(e) => {
                    warn!("Could not extract text from page {}: {}", number, e);
                    String::new()
                }
            })
            .collect::<Vec<_>>();

        debug!("Extracted text from {} pages", pages.len());
        Ok(ExtractedText::new(pages))
    }
}

/// Extractor for tests: treats the bytes as UTF-8 text with form-feed page breaks.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub struct FormFeedExtractor;

    impl TextExtractor for FormFeedExtractor {
        fn extract(&self, bytes: &[u8]) -> Result<ExtractedText> {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| RepositoryError::Extraction(e.to_string()))?;
            if text.is_empty() {
                return Err(RepositoryError::Extraction("PDF contains no pages".to_string()));
            }
            Ok(ExtractedText::from_full_text(text))
        }
    }
}
