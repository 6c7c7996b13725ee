//! Key-value persistence for tasks and sessions.
//!
//! The store is a narrow interface: read a string by key, write a string
//! by key. Collections are JSON-serialized whole on every mutation. The
//! [`load_or_default`] / [`save`] adapters never propagate failure --
//! a missing or unreadable value falls back to the default and a failed
//! write is dropped, both with a diagnostic log line. The in-memory state
//! remains the source of truth either way.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::warn;
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::data_dir;
use crate::error::{CoreError, StorageError};

/// Narrow storage interface, injectable so tests can substitute an
/// in-memory or failing implementation.
pub trait KvStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// SQLite-backed store: a single `kv(key, value)` table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the store at `~/.config/focuskit/focuskit.db`, creating the
    /// file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("focuskit.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open the store at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: PathBuf::from(path),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl KvStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral use.
///
/// Clones share the same map, so a test can keep a handle to inspect what
/// an `App` persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.map().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.map().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read and deserialize `key`, falling back to `T::default()` on a missing
/// key, unreadable value, or read failure. Failures are logged, never
/// raised.
pub fn load_or_default<T>(store: &dyn KvStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(err) => {
            warn!("failed to read {key:?} from the store, using defaults: {err}");
            return T::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            warn!("stored value under {key:?} is unreadable, using defaults: {err}");
            T::default()
        }
    }
}

/// Serialize and write `value` under `key`. A failed write is logged and
/// dropped; the caller's in-memory state stays authoritative.
pub fn save<T>(store: &dyn KvStore, key: &str, value: &T)
where
    T: Serialize + ?Sized,
{
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(err) => {
            warn!("failed to serialize {key:?}, dropping the write: {err}");
            return;
        }
    };
    if let Err(err) = store.set(key, &raw) {
        warn!("failed to persist {key:?}, keeping in-memory state: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;

    /// A store whose every operation fails, for exercising the swallow
    /// paths.
    struct FailingStore;

    impl KvStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::QueryFailed("disk on fire".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::QueryFailed("quota exceeded".into()))
        }
    }

    fn sample_tasks() -> Vec<Task> {
        vec![Task {
            id: "t1".into(),
            title: "Write report".into(),
            category: "work".into(),
            estimate: 4,
            done: false,
            completed_pomodoros: 2,
        }]
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStore::new();
        assert!(store.get("tasks").unwrap().is_none());
        store.set("tasks", "[]").unwrap();
        assert_eq!(store.get("tasks").unwrap().unwrap(), "[]");
    }

    #[test]
    fn memory_store_clones_share_contents() {
        let store = MemoryStore::new();
        let handle = store.clone();
        store.set("tasks", "[]").unwrap();
        assert_eq!(handle.get("tasks").unwrap().unwrap(), "[]");
    }

    #[test]
    fn sqlite_store_round_trips() {
        let store = SqliteStore::open_memory().unwrap();
        assert!(store.get("tasks").unwrap().is_none());
        store.set("tasks", "[1]").unwrap();
        store.set("tasks", "[1,2]").unwrap();
        assert_eq!(store.get("tasks").unwrap().unwrap(), "[1,2]");
    }

    #[test]
    fn sqlite_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focuskit.db");
        {
            let store = SqliteStore::open_at(&path).unwrap();
            store.set("sessions", "[42]").unwrap();
        }
        let store = SqliteStore::open_at(&path).unwrap();
        assert_eq!(store.get("sessions").unwrap().unwrap(), "[42]");
    }

    #[test]
    fn load_or_default_round_trips_collections() {
        let store = MemoryStore::new();
        let tasks = sample_tasks();
        save(&store, "tasks", &tasks);
        let loaded: Vec<Task> = load_or_default(&store, "tasks");
        assert_eq!(loaded, tasks);
    }

    #[test]
    fn missing_key_falls_back_to_default() {
        let store = MemoryStore::new();
        let loaded: Vec<Task> = load_or_default(&store, "tasks");
        assert!(loaded.is_empty());
    }

    #[test]
    fn corrupt_value_falls_back_to_default() {
        let store = MemoryStore::new();
        store.set("tasks", "{not json").unwrap();
        let loaded: Vec<Task> = load_or_default(&store, "tasks");
        assert!(loaded.is_empty());

        // Incompatible shape, not just malformed text.
        store.set("tasks", "{\"version\": 2}").unwrap();
        let loaded: Vec<Task> = load_or_default(&store, "tasks");
        assert!(loaded.is_empty());
    }

    #[test]
    fn failing_store_is_swallowed_on_both_paths() {
        let store = FailingStore;
        let loaded: Vec<Task> = load_or_default(&store, "tasks");
        assert!(loaded.is_empty());
        save(&store, "tasks", &sample_tasks()); // must not panic
    }
}
