//! Politeness enforcement: robots.txt compliance and per-domain throttling
//!
//! The enforcer gates every fetch twice. First, robots.txt rules for the
//! URL's domain are fetched lazily, cached for the process lifetime, and
//! consulted for the URL path. Second, a minimum inter-request interval per
//! domain is enforced; waiting blocks only the calling worker.

mod robots;
mod throttle;

pub use robots::{RobotsCache, RobotsRules};
pub use throttle::DomainThrottle;

use crate::crawler::Fetcher;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Combined robots.txt gate and per-domain rate limiter
pub struct Politeness {
    robots: RobotsCache,
    throttle: DomainThrottle,
}

impl Politeness {
    /// Creates an enforcer with the given minimum per-domain interval
    pub fn new(fetcher: Arc<dyn Fetcher>, min_interval: Duration) -> Self {
        Self {
            robots: RobotsCache::new(fetcher),
            throttle: DomainThrottle::new(min_interval),
        }
    }

    /// Checks whether a URL is allowed by its domain's robots.txt
    ///
    /// Fetches and caches the rules on first access to the domain. Network
    /// failure to obtain robots.txt means "no policy available" and
    /// defaults to allow; only an explicit Disallow rule denies.
    pub async fn is_allowed(&self, url: &Url) -> bool {
        self.robots.is_allowed(url).await
    }

    /// Waits until the calling worker may fetch from the given domain
    ///
    /// Enforces the minimum inter-request interval. Concurrent callers for
    /// the same domain serialize; callers for other domains are unaffected.
    pub async fn await_turn(&self, domain: &str) {
        self.throttle.await_turn(domain).await;
    }
}
