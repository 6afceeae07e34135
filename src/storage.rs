use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::StorageError;

/// Named-blob storage, the local equivalent of a browser's local storage.
pub trait BlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: HashMap<String, String>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.blobs.contains_key(key)
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.blobs.remove(key);
        Ok(())
    }
}

/// Blobs kept in a single SQLite key/value table.
#[derive(Debug)]
pub struct SqliteBlobStore {
    conn: Connection,
}

impl SqliteBlobStore {
    /// Opens the store at the default state location.
    pub fn new() -> Result<Self, StorageError> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("quizr.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS blobs (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        Ok(Self { conn })
    }
}

impl BlobStore for SqliteBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM blobs WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            r#"
            INSERT INTO blobs (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM blobs WHERE key = ?1", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn exercise(store: &mut dyn BlobStore) {
        assert_eq!(store.get("Scoreboard").unwrap(), None);

        store.set("Scoreboard", "[]").unwrap();
        assert_eq!(store.get("Scoreboard").unwrap().as_deref(), Some("[]"));

        store.set("Scoreboard", "[1]").unwrap();
        assert_eq!(store.get("Scoreboard").unwrap().as_deref(), Some("[1]"));

        store.remove("Scoreboard").unwrap();
        assert_eq!(store.get("Scoreboard").unwrap(), None);

        // removing twice is fine
        store.remove("Scoreboard").unwrap();
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryBlobStore::new();
        exercise(&mut store);
        assert!(!store.contains("Scoreboard"));
    }

    #[test]
    fn test_sqlite_in_memory_store() {
        let mut store = SqliteBlobStore::open_in_memory().unwrap();
        exercise(&mut store);
    }

    #[test]
    fn test_sqlite_persists_across_connections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("quizr.db");

        {
            let mut store = SqliteBlobStore::open(&path).unwrap();
            store.set("Scoreboard", r#"[{"initials":"BCF","score":10}]"#).unwrap();
        }

        let store = SqliteBlobStore::open(&path).unwrap();
        assert_eq!(
            store.get("Scoreboard").unwrap().as_deref(),
            Some(r#"[{"initials":"BCF","score":10}]"#)
        );
    }

    #[test]
    fn test_keys_are_independent() {
        let mut store = SqliteBlobStore::open_in_memory().unwrap();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.remove("a").unwrap();

        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }
}
