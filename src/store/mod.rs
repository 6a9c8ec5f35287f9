//! Content-addressed, deduplicating block store
//!
//! Fetched documents are split into fixed-size blocks, each identified by
//! the hex-encoded SHA-256 of its bytes. The hash is the sole storage key,
//! so identical blocks across documents (or across crawl passes) occupy a
//! single physical entry.

mod chunk;
mod sqlite;

pub use chunk::{chunk_data, DEFAULT_CHUNK_SIZE};
pub use sqlite::{ContentStore, VersionRecord};

use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to open database: {0}")]
    Open(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Computes the hex-encoded SHA-256 content hash of a block
pub fn hash_block(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
