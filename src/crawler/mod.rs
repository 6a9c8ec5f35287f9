//! Crawl engine: fetching, link extraction, and orchestration
//!
//! This module contains the per-URL crawl pipeline and the worker pool that
//! drives it: politeness gate, fetch, chunk-and-store, Merkle diff against
//! the previous version, best-effort peer publishing, and link extraction
//! back into the frontier.

mod fetcher;
mod orchestrator;
mod parser;

pub use fetcher::{FetchError, Fetcher, HttpFetcher};
pub use orchestrator::{CrawlStage, CrawlSummary, Orchestrator};
pub use parser::extract_links;

use crate::config::Config;
use crate::dht::DhtTransport;
use crate::frontier::Frontier;
use crate::index::{Indexer, SqliteIndex};
use crate::politeness::Politeness;
use crate::store::ContentStore;
use crate::MeshError;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Runs a complete crawl from the given seed URLs
///
/// Builds the store, fetcher, politeness enforcer, and frontier from the
/// configuration, seeds the frontier, and drives the orchestrator's worker
/// pool until the frontier drains or `max_pages` URLs have been attempted.
///
/// An optional transport connects the node to peer crawlers; pass `None`
/// for a standalone crawl.
pub async fn crawl(
    config: Config,
    seeds: Vec<String>,
    max_pages: usize,
    dht: Option<Arc<dyn DhtTransport>>,
) -> Result<CrawlSummary, MeshError> {
    let store = Arc::new(ContentStore::open(Path::new(
        &config.storage.database_path,
    ))?);
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&config)?);
    let politeness = Arc::new(Politeness::new(
        Arc::clone(&fetcher),
        Duration::from_millis(config.crawler.domain_delay_ms),
    ));
    let frontier = Arc::new(Frontier::new());

    let seeded = frontier.add_seeds(&seeds);
    tracing::info!("Seeded frontier with {} of {} URLs", seeded, seeds.len());

    if let Some(dht) = &dht {
        dht.set_encryption(config.dht.encryption);
        if let Err(e) = dht.join(&config.dht.bootstrap_peers) {
            tracing::warn!("Could not join peer mesh: {}", e);
        }
    }

    let indexer = match &config.storage.index_path {
        Some(index_path) => {
            let index = SqliteIndex::open(Path::new(index_path))?;
            tracing::info!("Indexing crawled documents into {}", index_path);
            Some(Arc::new(index) as Arc<dyn Indexer>)
        }
        None => None,
    };

    let mut orchestrator = Orchestrator::new(config, frontier, politeness, store, fetcher);
    if let Some(dht) = dht {
        orchestrator = orchestrator.with_dht(dht);
    }
    if let Some(indexer) = indexer {
        orchestrator = orchestrator.with_indexer(indexer);
    }

    Ok(orchestrator.run(max_pages).await)
}
