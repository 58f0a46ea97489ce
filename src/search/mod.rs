// file: src/search/mod.rs
// description: serial search and page lookup module exports
// reference: internal module structure

pub mod engine;
pub mod page_lookup;

pub use engine::SerialSearch;
pub use page_lookup::PageLookup;
