//! Meshcrawl: a cooperative, deduplicating web crawler
//!
//! This crate implements a crawler that stores fetched content in a
//! content-addressed block store, detects changes between crawl passes with
//! Merkle tree diffs, and propagates discovered URLs and diffs to peer
//! crawlers over a distributed pub/sub transport.

pub mod config;
pub mod crawler;
pub mod dht;
pub mod frontier;
pub mod index;
pub mod merkle;
pub mod politeness;
pub mod store;
pub mod url;

use thiserror::Error;

/// Main error type for Meshcrawl operations
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Index error: {0}")]
    Index(#[from] index::IndexError),

    #[error("DHT error: {0}")]
    Dht(#[from] dht::DhtError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Crawl error at {stage:?} for {url}: {message}")]
    Crawl {
        url: String,
        stage: crawler::CrawlStage,
        message: String,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Meshcrawl operations
pub type Result<T> = std::result::Result<T, MeshError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlStage, CrawlSummary, Orchestrator};
pub use frontier::Frontier;
pub use merkle::MerkleTree;
pub use store::ContentStore;
pub use url::{extract_domain, normalize_url, resolve_link};
