//! Per-domain minimum-interval throttle

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

/// Enforces a minimum interval between requests to the same domain
///
/// Each call reserves the next available fetch slot for its domain under a
/// short-lived lock, then sleeps outside the lock until the slot arrives.
/// Reserving before sleeping means two workers hitting the same domain
/// cannot both observe the old timestamp; they serialize one interval
/// apart. Workers on other domains never wait.
pub struct DomainThrottle {
    min_interval: Duration,
    slots: Mutex<HashMap<String, Instant>>,
}

impl DomainThrottle {
    /// Creates a throttle with the given minimum inter-request interval
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        self.slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Waits until the calling worker may fetch from the given domain
    ///
    /// The first request to a domain proceeds immediately. Subsequent
    /// requests wait out the remaining deficit of the minimum interval
    /// since the domain's previous (possibly still pending) fetch slot.
    pub async fn await_turn(&self, domain: &str) {
        let slot = {
            let mut slots = self.lock();
            let now = Instant::now();
            let slot = match slots.get(domain) {
                Some(prev) => (*prev + self.min_interval).max(now),
                None => now,
            };
            slots.insert(domain.to_string(), slot);
            slot
        };

        let now = Instant::now();
        if slot > now {
            tracing::trace!("Throttling {} for {:?}", domain, slot - now);
            tokio::time::sleep_until(slot).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_first_request_immediate() {
        let throttle = DomainThrottle::new(Duration::from_millis(500));
        let start = Instant::now();
        throttle.await_turn("example.com").await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_second_request_waits_interval() {
        let throttle = DomainThrottle::new(Duration::from_millis(100));
        throttle.await_turn("example.com").await;
        let start = Instant::now();
        throttle.await_turn("example.com").await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_domains_independent() {
        let throttle = DomainThrottle::new(Duration::from_millis(200));
        throttle.await_turn("a.example.com").await;
        let start = Instant::now();
        throttle.await_turn("b.example.com").await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_concurrent_same_domain_serialize() {
        let throttle = Arc::new(DomainThrottle::new(Duration::from_millis(50)));
        let start = Instant::now();
        let mut handles = Vec::new();
        for _ in 0..3 {
            let t = Arc::clone(&throttle);
            handles.push(tokio::spawn(async move {
                t.await_turn("example.com").await;
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        // Three fetch slots spaced 50ms apart: at least 100ms total.
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
