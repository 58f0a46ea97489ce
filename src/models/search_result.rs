// file: src/models/search_result.rs
// description: Serial search match model with confidence classification
// reference: Used for serial-number search results

use crate::models::document::DocumentId;
use crate::models::page::CorpusPage;
use serde::{Deserialize, Serialize};

/// Confidence of a page match, in ranking priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// One of the prefixed extraction patterns matched.
    Exact,
    /// Only the general fallback pattern matched.
    Possible,
    /// Pre-selected by a literal pattern but no span could be extracted.
    None,
}

/// Extracted span inside a page's text. Offsets count characters, not bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSpan {
    pub text: String,
    pub position: usize,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
    #[serde(rename = "id")]
    pub document_id: DocumentId,

    #[serde(rename = "nombre")]
    pub document_name: String,

    #[serde(rename = "num_paginas")]
    pub page_count: u32,

    #[serde(rename = "pagina_id", skip_serializing_if = "Option::is_none")]
    pub page_id: Option<i64>,

    #[serde(rename = "numero_pagina")]
    pub page_number: u32,

    /// Full page text
    #[serde(rename = "contenido")]
    pub text: String,

    #[serde(rename = "matchedText", skip_serializing_if = "Option::is_none")]
    pub matched_text: Option<String>,

    #[serde(rename = "matchPosition", skip_serializing_if = "Option::is_none")]
    pub match_position: Option<usize>,

    #[serde(rename = "matchContext", skip_serializing_if = "Option::is_none")]
    pub match_context: Option<String>,

    #[serde(rename = "exactMatch")]
    pub exact_match: bool,

    #[serde(rename = "possibleMatch")]
    pub possible_match: bool,

    #[serde(rename = "matchType")]
    pub kind: MatchKind,
}

impl SearchMatch {
    pub fn new(page: &CorpusPage, kind: MatchKind, span: Option<MatchSpan>) -> Self {
        let (matched_text, match_position, match_context) = match span {
            Some(span) => (Some(span.text), Some(span.position), Some(span.context)),
            None => (None, None, None),
        };

        Self {
            document_id: page.document_id,
            document_name: page.document_name.clone(),
            page_count: page.page_count,
            page_id: page.page_id,
            page_number: page.page_number,
            text: page.text.clone(),
            matched_text,
            match_position,
            match_context,
            exact_match: kind == MatchKind::Exact,
            possible_match: kind == MatchKind::Possible,
            kind,
        }
    }
}
