// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod document;
pub mod page;
pub mod search_result;

pub use document::{
    BinaryLocation, Document, DocumentId, DocumentSummary, NewDocument, TextLocation,
    UploadReceipt,
};
pub use page::{CorpusPage, PageProbe, PageRecord};
pub use search_result::{MatchKind, MatchSpan, SearchMatch};
