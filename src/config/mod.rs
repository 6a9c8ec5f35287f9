//! Configuration: loading, parsing, and validating TOML files
//!
//! Every key has a default, so `Config::default()` and an empty TOML file
//! both yield a working standalone-crawl configuration.
//!
//! # Example
//!
//! ```no_run
//! use meshcrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Workers: {}", config.crawler.worker_count);
//! ```

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{Config, CrawlerConfig, DhtConfig, StorageConfig, UserAgentConfig};
