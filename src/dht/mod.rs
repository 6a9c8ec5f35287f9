//! Distributed pub/sub transport contract
//!
//! The crawl core never talks to a concrete DHT implementation; it depends
//! only on the [`DhtTransport`] capability. Discovered URLs travel as raw
//! UTF-8 bytes on the URL topic, and diff summaries travel as JSON
//! [`DiffAnnouncement`] payloads on the diff topic, so a downstream index
//! can be kept incrementally fresh without re-transmitting unchanged
//! content.

mod memory;

pub use memory::{LocalHub, LocalTransport};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Default topic for discovered-URL broadcasts
pub const URL_TOPIC: &str = "urls";

/// Default topic for diff announcements
pub const DIFF_TOPIC: &str = "diffs";

/// Errors surfaced by a DHT transport
#[derive(Debug, Error)]
pub enum DhtError {
    #[error("Publish to topic '{topic}' failed: {reason}")]
    Publish { topic: String, reason: String },

    #[error("Subscribe to topic '{topic}' failed: {reason}")]
    Subscribe { topic: String, reason: String },

    #[error("Peer not found: {0}")]
    PeerNotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Callback invoked for each message received on a subscribed topic
///
/// The first argument is the sending peer's identifier, the second is the
/// raw payload.
pub type MessageCallback = Arc<dyn Fn(&str, &[u8]) + Send + Sync>;

/// Publish/subscribe capability provided by the distributed hash table
///
/// The crawl core uses this to broadcast discovered URLs and diff
/// summaries, and to receive URLs discovered by peers. Wire protocol, peer
/// discovery, and gossip internals are the implementor's concern.
pub trait DhtTransport: Send + Sync {
    /// Joins the network using a list of bootstrap peers
    fn join(&self, bootstrap_peers: &[String]) -> Result<(), DhtError>;

    /// Publishes a message to a topic
    fn publish(&self, topic: &str, data: &[u8]) -> Result<(), DhtError>;

    /// Subscribes to a topic; the callback fires for each peer message
    fn subscribe(&self, topic: &str, callback: MessageCallback) -> Result<(), DhtError>;

    /// Returns the peers currently known for a topic
    fn get_peers(&self, topic: &str) -> Vec<String>;

    /// Sends a message directly to one peer
    fn send_direct(&self, peer_id: &str, data: &[u8]) -> Result<(), DhtError>;

    /// Enables or disables payload encryption for all messages
    fn set_encryption(&self, enabled: bool);
}

/// Summary of the changed blocks between two crawl passes of one URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffAnnouncement {
    /// The crawled URL
    pub url: String,
    /// Merkle root of the previous version, if one existed
    pub old_root: Option<String>,
    /// Merkle root of the new version, if the document was non-empty
    pub new_root: Option<String>,
    /// Leaf hashes that differ between the two versions
    pub changed: Vec<String>,
}

impl DiffAnnouncement {
    /// Serializes the announcement to its wire form
    pub fn to_bytes(&self) -> Result<Vec<u8>, DhtError> {
        serde_json::to_vec(self).map_err(|e| DhtError::Transport(e.to_string()))
    }

    /// Deserializes an announcement from its wire form
    pub fn from_bytes(data: &[u8]) -> Result<Self, DhtError> {
        serde_json::from_slice(data).map_err(|e| DhtError::Transport(e.to_string()))
    }
}
