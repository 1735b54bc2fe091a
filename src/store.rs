//! Persisted key-value storage behind the caches.
//!
//! `SqliteStore` keeps every namespace in one table; `MemoryStore` is the
//! in-process fake.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;

pub const INSIGHTS_NAMESPACE: &str = "history_insights";
pub const PROCESSING_TIMES_NAMESPACE: &str = "processing_times";
pub const STATUS_WATCH_NAMESPACE: &str = "status_watch";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries.write().clear();
        Ok(())
    }
}

/// One namespace of a SQLite key-value table
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    namespace: String,
}

impl SqliteStore {
    pub fn open(path: &Path, namespace: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(Arc::new(Mutex::new(conn)), namespace)
    }

    pub fn open_in_memory(namespace: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(Arc::new(Mutex::new(conn)), namespace)
    }

    /// Share one connection between several namespaces.
    pub fn with_connection(conn: Arc<Mutex<Connection>>, namespace: &str) -> Result<Self> {
        conn.lock().execute_batch(
            "CREATE TABLE IF NOT EXISTS kv_store (
                namespace  TEXT NOT NULL,
                key        TEXT NOT NULL,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (namespace, key)
            );",
        )?;

        Ok(Self {
            conn,
            namespace: namespace.to_string(),
        })
    }

    /// Another namespace on the same connection
    pub fn namespace(&self, namespace: &str) -> Self {
        Self {
            conn: self.conn.clone(),
            namespace: namespace.to_string(),
        }
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE namespace = ?1 AND key = ?2",
                params![self.namespace, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO kv_store (namespace, key, value, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(namespace, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![self.namespace, key, value, Utc::now()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "DELETE FROM kv_store WHERE namespace = ?1 AND key = ?2",
            params![self.namespace, key],
        )?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "DELETE FROM kv_store WHERE namespace = ?1",
            params![self.namespace],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_memory_store_basic() {
        let store = MemoryStore::new();
        assert_eq!(store.get("AOR").unwrap(), None);

        store.put("AOR", "opened").unwrap();
        assert_eq!(store.get("AOR").unwrap().as_deref(), Some("opened"));

        store.remove("AOR").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_sqlite_store_persists_across_reopen() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();

        {
            let store = SqliteStore::open(&path, INSIGHTS_NAMESPACE).unwrap();
            store.put("MED_RESULT", "processed").unwrap();
            store.put("MED_RESULT", "processed again").unwrap();
        }

        let store = SqliteStore::open(&path, INSIGHTS_NAMESPACE).unwrap();
        assert_eq!(
            store.get("MED_RESULT").unwrap().as_deref(),
            Some("processed again")
        );
    }

    #[test]
    fn test_sqlite_namespaces_are_isolated() {
        let insights = SqliteStore::open_in_memory(INSIGHTS_NAMESPACE).unwrap();
        let times = insights.namespace(PROCESSING_TIMES_NAMESPACE);

        insights.put("FC1", "insight").unwrap();
        times.put("FC1", "12").unwrap();

        insights.clear().unwrap();
        assert_eq!(insights.get("FC1").unwrap(), None);
        assert_eq!(times.get("FC1").unwrap().as_deref(), Some("12"));
    }
}
