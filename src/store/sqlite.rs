//! SQLite-backed content store
//!
//! Blocks live in a `blocks(hash PRIMARY KEY, data)` table; the hash is the
//! only key and an existing entry is never overwritten. Document versions
//! (the ordered block-hash sequence from one fetch of one URL) live in a
//! `versions` table so change detection works across process restarts.

use crate::store::{hash_block, StoreError, StoreResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// A persisted document version for one URL
#[derive(Debug, Clone)]
pub struct VersionRecord {
    /// Ordered block hashes from the most recent fetch
    pub leaves: Vec<String>,
    /// Merkle root of that fetch, if the document was non-empty
    pub root: Option<String>,
    /// RFC 3339 timestamp of the fetch
    pub fetched_at: String,
}

/// Content-addressed block store backed by SQLite
///
/// The connection is guarded by an internal mutex so a single store handle
/// can be shared across worker tasks behind an `Arc`.
pub struct ContentStore {
    conn: Mutex<Connection>,
}

impl ContentStore {
    /// Opens (or creates) the store at the given path
    ///
    /// Failure to open or migrate the database is fatal: the constructor
    /// returns an error and the crawl does not start.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path).map_err(|e| StoreError::Open(e.to_string()))?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory store (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Open(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> StoreResult<()> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS blocks (
                hash TEXT PRIMARY KEY,
                data BLOB NOT NULL
            );
            CREATE TABLE IF NOT EXISTS versions (
                url TEXT PRIMARY KEY,
                leaves TEXT NOT NULL,
                root TEXT,
                fetched_at TEXT NOT NULL
            );
        ",
        )?;
        Ok(())
    }

    // Recover the connection even if a panicking test poisoned the lock.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Stores a block, returning its content hash
    ///
    /// Idempotent: storing identical bytes twice returns the same hash and
    /// performs at most one physical write. An existing entry for the hash
    /// is never overwritten.
    pub fn store_block(&self, data: &[u8]) -> StoreResult<String> {
        let hash = hash_block(data);
        self.conn().execute(
            "INSERT OR IGNORE INTO blocks (hash, data) VALUES (?1, ?2)",
            params![hash, data],
        )?;
        Ok(hash)
    }

    /// Retrieves a block by its hash, or `None` if absent
    pub fn get_block(&self, hash: &str) -> StoreResult<Option<Vec<u8>>> {
        let conn = self.conn();
        let block = conn
            .query_row(
                "SELECT data FROM blocks WHERE hash = ?1",
                params![hash],
                |row| row.get(0),
            )
            .optional()?;
        Ok(block)
    }

    /// Stores a sequence of blocks, returning their hashes in order
    pub fn store_blocks(&self, blocks: &[Vec<u8>]) -> StoreResult<Vec<String>> {
        let mut hashes = Vec::with_capacity(blocks.len());
        for block in blocks {
            hashes.push(self.store_block(block)?);
        }
        Ok(hashes)
    }

    /// Retrieves a sequence of blocks by hash, preserving order
    ///
    /// Absent hashes yield `None` at their position rather than failing the
    /// whole batch.
    pub fn get_blocks(&self, hashes: &[String]) -> StoreResult<Vec<Option<Vec<u8>>>> {
        let mut blocks = Vec::with_capacity(hashes.len());
        for hash in hashes {
            blocks.push(self.get_block(hash)?);
        }
        Ok(blocks)
    }

    /// Counts the physical block entries in the store
    pub fn block_count(&self) -> StoreResult<u64> {
        let conn = self.conn();
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM blocks", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Loads the persisted document version for a URL, if any
    pub fn load_version(&self, url: &str) -> StoreResult<Option<VersionRecord>> {
        let conn = self.conn();
        let row = conn
            .query_row(
                "SELECT leaves, root, fetched_at FROM versions WHERE url = ?1",
                params![url],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((leaves_json, root, fetched_at)) => {
                let leaves: Vec<String> = serde_json::from_str(&leaves_json)?;
                Ok(Some(VersionRecord {
                    leaves,
                    root,
                    fetched_at,
                }))
            }
            None => Ok(None),
        }
    }

    /// Saves the document version for a URL, replacing any previous one
    pub fn save_version(
        &self,
        url: &str,
        leaves: &[String],
        root: Option<&str>,
    ) -> StoreResult<()> {
        let leaves_json = serde_json::to_string(leaves)?;
        let now = Utc::now().to_rfc3339();
        self.conn().execute(
            "INSERT INTO versions (url, leaves, root, fetched_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(url) DO UPDATE SET leaves = ?2, root = ?3, fetched_at = ?4",
            params![url, leaves_json, root, now],
        )?;
        Ok(())
    }
}
