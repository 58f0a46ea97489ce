// file: src/database/mod.rs
// description: database operations module exports
// reference: internal module structure

pub mod client;
pub mod insert;
pub mod queries;
pub mod schema;

pub use client::SqliteClient;
pub use insert::DocumentInserter;
pub use queries::DocumentQueries;
pub use schema::SchemaManager;
