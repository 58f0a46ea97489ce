// file: src/parser/mod.rs
// description: pdf parsing module exports
// reference: internal module structure

pub mod pdf;

pub use pdf::{ExtractedText, PdfExtractor, TextExtractor};
