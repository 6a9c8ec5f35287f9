//! Optional indexing collaborator
//!
//! After storing content the orchestrator may forward a tokenized
//! representation of the document for indexing. This is fire-and-forget
//! from the crawl's perspective: index failures are logged and never fail a
//! crawl. Ranking and scoring live in the downstream search service, not
//! here.

mod sqlite_index;
mod tokenizer;

pub use sqlite_index::SqliteIndex;
pub use tokenizer::tokenize;

use thiserror::Error;

/// Errors that can occur during index operations
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Failed to open index database: {0}")]
    Open(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Capability for adding documents to a posting-list index
pub trait Indexer: Send + Sync {
    /// Records that the document `id` contains the given tokens
    fn add_document(&self, id: &str, tokens: &[String]) -> IndexResult<()>;
}
