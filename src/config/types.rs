use serde::Deserialize;

/// Main configuration structure for Meshcrawl
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub dht: DhtConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of concurrent crawl workers
    #[serde(rename = "worker-count", default = "default_worker_count")]
    pub worker_count: u32,

    /// Minimum time between requests to the same domain (milliseconds)
    #[serde(rename = "domain-delay-ms", default = "default_domain_delay_ms")]
    pub domain_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Block size for content-addressed storage (bytes)
    #[serde(rename = "chunk-size", default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            domain_delay_ms: default_domain_delay_ms(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            chunk_size: default_chunk_size(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default = "default_contact_url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: default_contact_url(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite content store
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Optional path to the SQLite posting-list index
    #[serde(rename = "index-path", default)]
    pub index_path: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            index_path: None,
        }
    }
}

/// Peer transport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DhtConfig {
    /// Whether to join the peer mesh at all
    #[serde(default)]
    pub enabled: bool,

    /// Topic carrying discovered URLs
    #[serde(rename = "url-topic", default = "default_url_topic")]
    pub url_topic: String,

    /// Topic carrying content-change announcements
    #[serde(rename = "diff-topic", default = "default_diff_topic")]
    pub diff_topic: String,

    /// Peers to join on startup
    #[serde(rename = "bootstrap-peers", default)]
    pub bootstrap_peers: Vec<String>,

    /// Whether the transport should encrypt payloads
    #[serde(default)]
    pub encryption: bool,
}

impl Default for DhtConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url_topic: default_url_topic(),
            diff_topic: default_diff_topic(),
            bootstrap_peers: Vec::new(),
            encryption: false,
        }
    }
}

fn default_worker_count() -> u32 {
    4
}

fn default_domain_delay_ms() -> u64 {
    1000
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_chunk_size() -> usize {
    crate::store::DEFAULT_CHUNK_SIZE
}

fn default_crawler_name() -> String {
    "meshcrawl".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_contact_url() -> String {
    "https://example.com/crawler".to_string()
}

fn default_database_path() -> String {
    "./meshcrawl.db".to_string()
}

fn default_url_topic() -> String {
    crate::dht::URL_TOPIC.to_string()
}

fn default_diff_topic() -> String {
    crate::dht::DIFF_TOPIC.to_string()
}
