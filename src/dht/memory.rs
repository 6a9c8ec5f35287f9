//! In-process pub/sub transport
//!
//! [`LocalHub`] connects any number of [`LocalTransport`] nodes inside one
//! process. It implements the full transport contract — topic delivery to
//! every subscriber except the sender, peer listing, and direct messages —
//! and stands in for a real gossip transport in tests and single-node runs.

use crate::dht::{DhtError, DhtTransport, MessageCallback};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct HubInner {
    /// topic -> [(node id, callback)]
    topics: HashMap<String, Vec<(String, MessageCallback)>>,
    /// node id -> direct-message handler
    direct: HashMap<String, MessageCallback>,
}

/// Shared message hub connecting local transport nodes
#[derive(Default)]
pub struct LocalHub {
    inner: Mutex<HubInner>,
}

impl LocalHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Creates a node attached to this hub
    pub fn node(self: &Arc<Self>, id: impl Into<String>) -> LocalTransport {
        LocalTransport {
            id: id.into(),
            hub: Arc::clone(self),
            encryption: AtomicBool::new(false),
        }
    }
}

/// One node's view of the local hub
pub struct LocalTransport {
    id: String,
    hub: Arc<LocalHub>,
    encryption: AtomicBool,
}

impl LocalTransport {
    /// Returns this node's peer identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Registers a handler for direct messages addressed to this node
    pub fn on_direct(&self, callback: MessageCallback) {
        self.hub.lock().direct.insert(self.id.clone(), callback);
    }
}

impl DhtTransport for LocalTransport {
    fn join(&self, bootstrap_peers: &[String]) -> Result<(), DhtError> {
        // The hub is fully connected; joining is a no-op beyond logging.
        tracing::debug!(
            "Node {} joined local hub ({} bootstrap peers given)",
            self.id,
            bootstrap_peers.len()
        );
        Ok(())
    }

    fn publish(&self, topic: &str, data: &[u8]) -> Result<(), DhtError> {
        let subscribers: Vec<(String, MessageCallback)> = {
            let inner = self.hub.lock();
            inner
                .topics
                .get(topic)
                .map(|subs| {
                    subs.iter()
                        .filter(|(id, _)| id != &self.id)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        };

        // Callbacks run outside the hub lock so a subscriber may publish.
        for (_, callback) in subscribers {
            callback(&self.id, data);
        }
        Ok(())
    }

    fn subscribe(&self, topic: &str, callback: MessageCallback) -> Result<(), DhtError> {
        self.hub
            .lock()
            .topics
            .entry(topic.to_string())
            .or_default()
            .push((self.id.clone(), callback));
        Ok(())
    }

    fn get_peers(&self, topic: &str) -> Vec<String> {
        let inner = self.hub.lock();
        inner
            .topics
            .get(topic)
            .map(|subs| {
                subs.iter()
                    .map(|(id, _)| id.clone())
                    .filter(|id| id != &self.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn send_direct(&self, peer_id: &str, data: &[u8]) -> Result<(), DhtError> {
        let handler = self.hub.lock().direct.get(peer_id).cloned();
        match handler {
            Some(callback) => {
                callback(&self.id, data);
                Ok(())
            }
            None => Err(DhtError::PeerNotFound(peer_id.to_string())),
        }
    }

    fn set_encryption(&self, enabled: bool) {
        self.encryption.store(enabled, Ordering::Relaxed);
    }
}
