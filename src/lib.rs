//! Top Albums Library
//!
//! Ingests the ranked top albums feed into a SQLite catalog and serves it
//! through filtered, sorted and paginated queries.

pub mod album_store;
pub mod config;
pub mod feed;
pub mod ingestion;
pub mod query;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use album_store::{Album, AlbumStore, SqliteAlbumStore, StoreError};
pub use ingestion::{IngestionError, IngestionService, ReconciliationEngine, ReconciliationResult};
pub use query::{QueryEngine, QueryError, QueryRequest, QueryResult};
