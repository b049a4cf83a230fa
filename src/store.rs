//! Result persistence.
//!
//! The engine never touches storage directly: it is handed a
//! [`KeyValueStore`] and writes opaque string values through it. Two
//! backends are provided, an in-memory map and a single JSON file, and
//! [`ResultStore`] layers the attempt/history surface on top of either.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::{CompletedAttemptRecord, HistoryEntry};

/// Maximum number of history entries retained, newest first.
pub const HISTORY_LIMIT: usize = 5;

const HISTORY_KEY: &str = "history";

/// Error type for store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    Io(io::Error),
    /// A stored value could not be encoded or decoded.
    Serde(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "store IO error: {}", e),
            StoreError::Serde(e) => write!(f, "store encoding error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Serde(e) => Some(e),
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err)
    }
}

/// A minimal injected key-value surface. Keys and values are plain strings;
/// the caller decides the encoding.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

/// Ephemeral in-memory backend, used by tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// File-backed store: a single JSON object mapping keys to values.
///
/// The whole map is loaded at open and rewritten on every set. A missing
/// file is treated as an empty store.
pub struct JsonFileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl JsonFileStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(StoreError::Io(e)),
        };
        Ok(Self { path, entries })
    }

    fn persist(&self) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        self.persist()
    }
}

/// Attempt and history persistence over any [`KeyValueStore`].
pub struct ResultStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ResultStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persist the latest completed attempt for its exam, replacing any
    /// previous one. The full record round-trips, question snapshot
    /// included, since the review screen depends on it.
    pub fn save_attempt(&mut self, record: &CompletedAttemptRecord) -> Result<(), StoreError> {
        let value = serde_json::to_string(record)?;
        self.store.set(&Self::attempt_key(&record.exam_id), value)
    }

    /// Load the stored attempt for an exam, if any. A value that fails to
    /// decode is treated as absent (and logged), never as a hard error.
    pub fn load_attempt(&self, exam_id: &str) -> Option<CompletedAttemptRecord> {
        let value = self.store.get(&Self::attempt_key(exam_id))?;
        match serde_json::from_str(&value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(exam_id, error = %e, "stored attempt record is unreadable");
                None
            }
        }
    }

    /// Prepend a history entry and truncate to [`HISTORY_LIMIT`].
    ///
    /// Read-modify-write of a single key, so the append and the eviction
    /// land in one store write.
    pub fn append_history(&mut self, entry: HistoryEntry) -> Result<(), StoreError> {
        let mut history = self.history();
        history.insert(0, entry);
        history.truncate(HISTORY_LIMIT);
        let value = serde_json::to_string(&history)?;
        self.store.set(HISTORY_KEY, value)
    }

    /// Recent attempts, newest first. Unreadable history is treated as
    /// empty.
    pub fn history(&self) -> Vec<HistoryEntry> {
        let Some(value) = self.store.get(HISTORY_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str(&value) {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!(error = %e, "stored history is unreadable; starting fresh");
                Vec::new()
            }
        }
    }

    fn attempt_key(exam_id: &str) -> String {
        format!("attempt:{}", exam_id)
    }
}
