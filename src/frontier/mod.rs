//! Crawl frontier: shared FIFO queue plus seen-set
//!
//! The frontier holds discovered-but-not-yet-fetched URLs. A single mutex
//! guards the queue and the seen-set together, so a URL can never be
//! visible in one without the other: check-and-enqueue is atomic, and the
//! first enqueuer of a normalized URL wins regardless of arrival order.

use crate::url::normalize_url;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};
use url::Url;

struct FrontierInner {
    queue: VecDeque<Url>,
    seen: HashSet<String>,
}

/// Thread-safe URL frontier with built-in deduplication
///
/// All operations may be called concurrently from any number of workers.
/// The lock is held only for the instant of a membership check plus
/// enqueue, or a dequeue. The frontier is unbounded; capacity and
/// backpressure are an extension point.
pub struct Frontier {
    inner: Mutex<FrontierInner>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(FrontierInner {
                queue: VecDeque::new(),
                seen: HashSet::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierInner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Adds seed URLs, skipping any that fail to normalize
    ///
    /// Returns the number of seeds actually enqueued.
    pub fn add_seeds<I, S>(&self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0;
        for url in urls {
            match normalize_url(url.as_ref()) {
                Ok(normalized) => {
                    if self.add_normalized(normalized) {
                        added += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping invalid seed URL {}: {}", url.as_ref(), e);
                }
            }
        }
        added
    }

    /// Adds a URL to the frontier, normalizing it first
    ///
    /// If the normalized form has already been seen the call is a silent
    /// no-op. Returns whether the URL was newly enqueued. Malformed input
    /// is discarded with a debug log.
    pub fn add_url(&self, url: &str) -> bool {
        match normalize_url(url) {
            Ok(normalized) => self.add_normalized(normalized),
            Err(e) => {
                tracing::debug!("Discarding unenqueueable URL {}: {}", url, e);
                false
            }
        }
    }

    /// Adds an already-normalized URL under the frontier lock
    pub fn add_normalized(&self, url: Url) -> bool {
        let mut inner = self.lock();
        if inner.seen.contains(url.as_str()) {
            return false;
        }
        inner.seen.insert(url.as_str().to_string());
        inner.queue.push_back(url);
        true
    }

    /// Removes and returns the earliest-enqueued URL, or `None` if empty
    ///
    /// Dequeued URLs stay in the seen-set, so a URL is processed at most
    /// once per frontier lifetime.
    pub fn take_next(&self) -> Option<Url> {
        self.lock().queue.pop_front()
    }

    /// Returns the number of queued (not yet taken) URLs
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    /// Returns the number of distinct URLs ever enqueued
    pub fn seen_count(&self) -> usize {
        self.lock().seen.len()
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}
