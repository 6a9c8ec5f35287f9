//! SQLite-backed posting-list index
//!
//! One durable key-value table: token -> comma-joined list of document
//! identifiers. Document identifiers are URLs, which never contain commas
//! in their normalized form's token position, so the join is unambiguous
//! enough for this collaborator's contract.

use crate::index::{IndexError, IndexResult, Indexer};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Posting-list store backed by SQLite
pub struct SqliteIndex {
    conn: Mutex<Connection>,
}

impl SqliteIndex {
    /// Opens (or creates) the index at the given path
    pub fn open(path: &Path) -> IndexResult<Self> {
        let conn = Connection::open(path).map_err(|e| IndexError::Open(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory index (for testing)
    pub fn open_in_memory() -> IndexResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| IndexError::Open(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> IndexResult<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS postings (
                token TEXT PRIMARY KEY,
                doc_ids TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Returns the posting list (document identifiers) for a token
    pub fn lookup(&self, token: &str) -> IndexResult<Vec<String>> {
        let conn = self.conn();
        let list: Option<String> = conn
            .query_row(
                "SELECT doc_ids FROM postings WHERE token = ?1",
                params![token],
                |row| row.get(0),
            )
            .optional()?;
        Ok(list
            .map(|l| {
                l.split(',')
                    .filter(|id| !id.is_empty())
                    .map(|id| id.to_string())
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl Indexer for SqliteIndex {
    fn add_document(&self, id: &str, tokens: &[String]) -> IndexResult<()> {
        // Dedup tokens before touching the store; repeated words in one
        // document are a single posting.
        let unique: BTreeSet<&String> = tokens.iter().collect();
        let conn = self.conn();
        for token in unique {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT doc_ids FROM postings WHERE token = ?1",
                    params![token],
                    |row| row.get(0),
                )
                .optional()?;

            let updated = match existing {
                Some(list) if list.split(',').any(|d| d == id) => continue,
                Some(list) => format!("{},{}", list, id),
                None => id.to_string(),
            };

            conn.execute(
                "INSERT INTO postings (token, doc_ids) VALUES (?1, ?2)
                 ON CONFLICT(token) DO UPDATE SET doc_ids = ?2",
                params![token, updated],
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_add_and_lookup() {
        let index = SqliteIndex::open_in_memory().unwrap();
        index
            .add_document("https://example.com/a", &tokens(&["rust", "crawler"]))
            .unwrap();

        assert_eq!(
            index.lookup("rust").unwrap(),
            vec!["https://example.com/a".to_string()]
        );
        assert!(index.lookup("absent").unwrap().is_empty());
    }

    #[test]
    fn test_posting_list_accumulates() {
        let index = SqliteIndex::open_in_memory().unwrap();
        index.add_document("doc1", &tokens(&["shared"])).unwrap();
        index.add_document("doc2", &tokens(&["shared"])).unwrap();

        let list = index.lookup("shared").unwrap();
        assert_eq!(list, vec!["doc1".to_string(), "doc2".to_string()]);
    }

    #[test]
    fn test_duplicate_document_not_repeated() {
        let index = SqliteIndex::open_in_memory().unwrap();
        index
            .add_document("doc1", &tokens(&["word", "word", "word"]))
            .unwrap();
        index.add_document("doc1", &tokens(&["word"])).unwrap();

        assert_eq!(index.lookup("word").unwrap(), vec!["doc1".to_string()]);
    }
}
