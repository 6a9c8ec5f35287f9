//! Crawl orchestrator: the per-URL state machine and its worker pool
//!
//! Each worker repeatedly dequeues a URL from the shared frontier and
//! drives it through the crawl pipeline to a terminal state before taking
//! the next. One bad URL never terminates the pool: every failure inside
//! the pipeline is caught at this boundary, logged with its stage, and
//! recorded as `Failed` for that URL only.

use crate::config::Config;
use crate::crawler::{extract_links, Fetcher};
use crate::dht::{DhtTransport, DiffAnnouncement, MessageCallback};
use crate::frontier::Frontier;
use crate::index::{tokenize, Indexer};
use crate::merkle::MerkleTree;
use crate::politeness::Politeness;
use crate::store::{chunk_data, hash_block, ContentStore};
use crate::{MeshError, UrlError};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Stages of the per-URL crawl pipeline
///
/// `Done`, `Skipped` (robots-denied), and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlStage {
    Queued,
    PolitenessCheck,
    Fetching,
    Storing,
    Diffing,
    Publishing,
    LinkExtraction,
    Done,
    Skipped,
    Failed,
}

/// End-of-run totals for a crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// URLs taken from the frontier and driven through the pipeline
    pub attempted: usize,
    /// URLs that reached `Done`
    pub succeeded: usize,
    /// URLs denied by robots.txt
    pub skipped: usize,
    /// URLs that ended in `Failed`
    pub failed: usize,
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pages attempted, {} succeeded, {} skipped, {} failed",
            self.attempted, self.succeeded, self.skipped, self.failed
        )
    }
}

/// Ties the crawl components together and runs the worker pool
pub struct Orchestrator {
    config: Config,
    frontier: Arc<Frontier>,
    politeness: Arc<Politeness>,
    store: Arc<ContentStore>,
    fetcher: Arc<dyn Fetcher>,
    dht: Option<Arc<dyn DhtTransport>>,
    indexer: Option<Arc<dyn Indexer>>,
}

impl Orchestrator {
    /// Creates an orchestrator over the given components
    pub fn new(
        config: Config,
        frontier: Arc<Frontier>,
        politeness: Arc<Politeness>,
        store: Arc<ContentStore>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            config,
            frontier,
            politeness,
            store,
            fetcher,
            dht: None,
            indexer: None,
        }
    }

    /// Attaches a peer transport for URL and diff propagation
    pub fn with_dht(mut self, dht: Arc<dyn DhtTransport>) -> Self {
        self.dht = Some(dht);
        self
    }

    /// Attaches an index collaborator fed after each successful store
    pub fn with_indexer(mut self, indexer: Arc<dyn Indexer>) -> Self {
        self.indexer = Some(indexer);
        self
    }

    /// Runs the crawl until the frontier drains or `max_pages` is reached
    ///
    /// `max_pages` of zero means unbounded. Subscribes to the peer URL
    /// topic first (peer-discovered URLs flow into the frontier for the
    /// whole run), then spawns the worker pool and waits for every worker
    /// to reach a terminal state on its current URL.
    pub async fn run(self, max_pages: usize) -> CrawlSummary {
        if let Some(dht) = &self.dht {
            let frontier = Arc::clone(&self.frontier);
            let callback: MessageCallback = Arc::new(move |from_peer: &str, data: &[u8]| {
                match std::str::from_utf8(data) {
                    Ok(url) => {
                        if frontier.add_url(url) {
                            tracing::debug!("Ingested URL from peer {}: {}", from_peer, url);
                        }
                    }
                    Err(_) => {
                        tracing::debug!("Ignoring non-UTF8 payload from peer {}", from_peer);
                    }
                }
            });
            if let Err(e) = dht.subscribe(&self.config.dht.url_topic, callback) {
                tracing::warn!("Could not subscribe to peer URL topic: {}", e);
            }
        }

        let worker_count = self.config.crawler.worker_count.max(1) as usize;
        let shared = Arc::new(Shared {
            orchestrator: self,
            max_pages,
            attempted: AtomicUsize::new(0),
            succeeded: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
        });

        tracing::info!("Starting crawl with {} workers", worker_count);
        let start = std::time::Instant::now();

        let mut handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let shared = Arc::clone(&shared);
            handles.push(tokio::spawn(async move {
                worker_loop(worker_id, shared).await;
            }));
        }
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("Worker terminated abnormally: {}", e);
            }
        }

        let summary = CrawlSummary {
            attempted: shared.attempted.load(Ordering::SeqCst),
            succeeded: shared.succeeded.load(Ordering::SeqCst),
            skipped: shared.skipped.load(Ordering::SeqCst),
            failed: shared.failed.load(Ordering::SeqCst),
        };
        tracing::info!("Crawl complete in {:?}: {}", start.elapsed(), summary);
        summary
    }
}

struct Shared {
    orchestrator: Orchestrator,
    max_pages: usize,
    attempted: AtomicUsize,
    succeeded: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    in_flight: AtomicUsize,
}

impl Shared {
    /// Reserves one page slot against the cap; fails when the cap is hit
    fn claim_page(&self) -> bool {
        self.attempted
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                if self.max_pages > 0 && n >= self.max_pages {
                    None
                } else {
                    Some(n + 1)
                }
            })
            .is_ok()
    }

    fn release_page(&self) {
        self.attempted.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn worker_loop(worker_id: usize, shared: Arc<Shared>) {
    loop {
        if !shared.claim_page() {
            tracing::debug!("Worker {} stopping: page cap reached", worker_id);
            break;
        }

        match shared.orchestrator.frontier.take_next() {
            Some(url) => {
                shared.in_flight.fetch_add(1, Ordering::SeqCst);
                process_url(&shared, &url).await;
                shared.in_flight.fetch_sub(1, Ordering::SeqCst);
            }
            None => {
                shared.release_page();
                // Another worker may still be mid-URL and about to enqueue
                // discovered links; only stop once nothing is in flight.
                if shared.in_flight.load(Ordering::SeqCst) == 0 {
                    tracing::debug!("Worker {} stopping: frontier drained", worker_id);
                    break;
                }
                tokio::time::sleep(Duration::from_millis(25)).await;
            }
        }
    }
}

/// Drives one URL to a terminal state, absorbing all pipeline errors
async fn process_url(shared: &Shared, url: &Url) {
    tracing::debug!("Processing {}", url);
    match drive(&shared.orchestrator, url).await {
        Ok(CrawlStage::Skipped) => {
            shared.skipped.fetch_add(1, Ordering::SeqCst);
        }
        Ok(_) => {
            shared.succeeded.fetch_add(1, Ordering::SeqCst);
        }
        Err(e) => {
            shared.failed.fetch_add(1, Ordering::SeqCst);
            tracing::error!("Crawl failed for {}: {}", url, e);
        }
    }
}

/// The per-URL pipeline: politeness, fetch, store, diff, publish, links
async fn drive(orch: &Orchestrator, url: &Url) -> Result<CrawlStage, MeshError> {
    // PolitenessCheck: fails closed only on an explicit robots disallow.
    if !orch.politeness.is_allowed(url).await {
        tracing::info!("Blocked by robots.txt: {}", url);
        return Ok(CrawlStage::Skipped);
    }

    let domain = crate::url::extract_domain(url).ok_or(MeshError::Url(UrlError::MissingDomain))?;
    orch.politeness.await_turn(&domain).await;

    // Fetching: no retry; a transient failure ends this URL's crawl.
    let body = orch
        .fetcher
        .fetch(url.as_str())
        .await
        .map_err(|e| MeshError::Crawl {
            url: url.to_string(),
            stage: CrawlStage::Fetching,
            message: e.to_string(),
        })?;

    // Storing: chunk and dedup-store. A failed block write loses that
    // block for this pass but keeps its position in the leaf sequence.
    let blocks = chunk_data(&body, orch.config.crawler.chunk_size);
    let mut leaves = Vec::with_capacity(blocks.len());
    for block in &blocks {
        match orch.store.store_block(block) {
            Ok(hash) => leaves.push(hash),
            Err(e) => {
                tracing::warn!("Lost block for {} this pass: {}", url, e);
                leaves.push(hash_block(block));
            }
        }
    }

    // Diffing: first crawl diffs against the empty tree, so every block
    // reports changed — correct, it is all new content.
    let previous = match orch.store.load_version(url.as_str()) {
        Ok(Some(version)) => version.leaves,
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!("Could not load previous version of {}: {}", url, e);
            Vec::new()
        }
    };
    let old_tree = MerkleTree::build(previous);
    let new_tree = MerkleTree::build(leaves.clone());
    let changed = new_tree.diff(&old_tree);

    if let Err(e) = orch
        .store
        .save_version(url.as_str(), &leaves, new_tree.root())
    {
        tracing::warn!("Could not persist version of {}: {}", url, e);
    }

    // Publishing: best-effort. A failed publish is dropped after logging;
    // the content stays local and the crawl of this URL continues.
    if let Some(dht) = &orch.dht {
        if changed.is_empty() {
            tracing::debug!("No changes for {}, nothing to publish", url);
        } else {
            let announcement = DiffAnnouncement {
                url: url.to_string(),
                old_root: old_tree.root().map(str::to_string),
                new_root: new_tree.root().map(str::to_string),
                changed: changed.clone(),
            };
            match announcement.to_bytes() {
                Ok(payload) => {
                    if let Err(e) = dht.publish(&orch.config.dht.diff_topic, &payload) {
                        tracing::warn!("Diff publish failed for {}: {}", url, e);
                    } else {
                        tracing::debug!("Published {} changed blocks for {}", changed.len(), url);
                    }
                }
                Err(e) => tracing::warn!("Could not encode diff for {}: {}", url, e),
            }
        }
    }

    // Indexing is fire-and-forget; the index service owns ranking.
    let html = String::from_utf8_lossy(&body);
    if let Some(indexer) = &orch.indexer {
        let tokens = tokenize(&html);
        if let Err(e) = indexer.add_document(url.as_str(), &tokens) {
            tracing::warn!("Indexing failed for {}: {}", url, e);
        }
    }

    // LinkExtraction: enqueue locally, announce newly-seen links to peers.
    // Only first-time links are rebroadcast, otherwise peers would echo
    // the same URLs back and forth indefinitely.
    let links = extract_links(&html, url);
    for link in links {
        let link_str = link.as_str().to_string();
        if orch.frontier.add_normalized(link) {
            tracing::debug!("Discovered and enqueued: {}", link_str);
            if let Some(dht) = &orch.dht {
                if let Err(e) = dht.publish(&orch.config.dht.url_topic, link_str.as_bytes()) {
                    tracing::warn!("URL publish failed for {}: {}", link_str, e);
                }
            }
        }
    }

    Ok(CrawlStage::Done)
}
