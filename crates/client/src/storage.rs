//! Durable key-value storage for client state.
//!
//! The session store persists the auth token, user profile, and per-user
//! shipping addresses through this abstraction so it can survive restarts.

use std::collections::HashMap;
use std::path::PathBuf;

/// String key-value storage with write-through persistence semantics.
///
/// Implementations must make writes immediately observable to subsequent
/// reads; durability is best-effort (a failed flush is logged, not surfaced).
pub trait Storage {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value.
    fn set(&mut self, key: &str, value: &str);

    /// Delete a value. Idempotent.
    fn remove(&mut self, key: &str);
}

/// Volatile in-memory storage, used in tests and private browsing contexts.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// File-backed storage persisting the whole map as one JSON document.
///
/// Every mutation rewrites the file. A write failure keeps the in-memory
/// state authoritative and is logged at warn.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileStorage {
    /// Open storage at `path`, loading any existing contents.
    ///
    /// A missing or unreadable file starts empty rather than failing: losing
    /// a persisted session falls back to the unauthenticated state.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = std::fs::read_to_string(&path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default();
        Self { path, values }
    }

    fn flush(&self) {
        match serde_json::to_string_pretty(&self.values) {
            Ok(contents) => {
                if let Err(e) = std::fs::write(&self.path, contents) {
                    tracing::warn!("failed to persist client storage to {:?}: {e}", self.path);
                }
            }
            Err(e) => tracing::warn!("failed to serialize client storage: {e}"),
        }
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_owned(), value.to_owned());
        self.flush();
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get("token"), None);

        storage.set("token", "abc");
        assert_eq!(storage.get("token").as_deref(), Some("abc"));

        storage.remove("token");
        assert_eq!(storage.get("token"), None);
        // Idempotent
        storage.remove("token");
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let path = std::env::temp_dir().join(format!(
            "denfit-storage-test-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        {
            let mut storage = FileStorage::open(&path);
            storage.set("user", "{\"id\":1}");
        }

        let reopened = FileStorage::open(&path);
        assert_eq!(reopened.get("user").as_deref(), Some("{\"id\":1}"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_file_storage_missing_file_starts_empty() {
        let storage = FileStorage::open("/nonexistent/denfit-test.json");
        assert_eq!(storage.get("token"), None);
    }
}
