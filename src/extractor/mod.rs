// file: src/extractor/mod.rs
// description: serial pattern generation, matching and ranking module exports
// reference: internal module structure

pub mod matcher;
pub mod patterns;
pub mod ranker;

pub use matcher::{MatchOutcome, TwoPassMatcher};
pub use patterns::{LiteralMode, LiteralPattern, SerialPatterns, normalize_serial_input};
pub use ranker::RelevanceRanker;
