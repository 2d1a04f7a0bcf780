//! Key-value persistence behind the saved-word list and theme.
//!
//! The browser build of this tool kept both in `localStorage`; embedded hosts
//! get the same contract through [`KvStore`]. [`FileStore`] hashes each key
//! into a filename under a store directory so arbitrary keys stay filesystem
//! safe, and [`MemStore`] backs tests and throwaway sessions.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// Saved-word list storage key, shared with the original browser build so an
/// exported store stays interchangeable.
pub const WORD_LIST_KEY: &str = "thai_reading_tool_word_list";

/// Theme preference storage key.
pub const THEME_KEY: &str = "thai_reading_tool_theme";

/// String key-value persistence with `localStorage` semantics: reads miss
/// softly and writes are fire-and-forget.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;

    /// Persist `value` under `key`. Errors are ignored to keep the widget
    /// responsive; implementations may log them.
    fn set(&mut self, key: &str, value: &str);

    fn remove(&mut self, key: &str);
}

/// Store backed by one file per key under a fixed directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let hash = format!("{:x}", hasher.finalize());
        self.dir.join(hash)
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.entry_path(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) {
        let path = self.entry_path(key);
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Err(err) = fs::write(&path, value) {
            warn!(path = %path.display(), "Failed to persist store entry: {err}");
        }
    }

    fn remove(&mut self, key: &str) {
        let _ = fs::remove_file(self.entry_path(key));
    }
}

/// In-memory store for tests and hosts without a filesystem.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    entries: HashMap<String, String>,
}

impl MemStore {
    pub fn new() -> Self {
        MemStore::default()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_store_dir() -> PathBuf {
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("readalong_store_{nonce}"))
    }

    #[test]
    fn file_store_round_trips_values() {
        let dir = unique_store_dir();
        let mut store = FileStore::new(&dir);
        store.set(WORD_LIST_KEY, "[{\"english\":\"cat\",\"thai\":\"แมว\"}]");
        assert_eq!(
            store.get(WORD_LIST_KEY).as_deref(),
            Some("[{\"english\":\"cat\",\"thai\":\"แมว\"}]")
        );
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn file_store_misses_softly_and_removes() {
        let dir = unique_store_dir();
        let mut store = FileStore::new(&dir);
        assert_eq!(store.get("absent"), None);
        store.set(THEME_KEY, "dark");
        store.remove(THEME_KEY);
        assert_eq!(store.get(THEME_KEY), None);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn mem_store_overwrites_in_place() {
        let mut store = MemStore::new();
        store.set("k", "one");
        store.set("k", "two");
        assert_eq!(store.get("k").as_deref(), Some("two"));
        store.remove("k");
        assert_eq!(store.get("k"), None);
    }
}
