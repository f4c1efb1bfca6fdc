use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A cached payload and when it was written, both in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub payload: T,
    pub timestamp: i64,
    /// When the request that produced this payload was dispatched.
    #[serde(default)]
    pub requested_at: i64,
}

impl<T> CachedData<T> {
    pub fn new(payload: T, timestamp: i64) -> Self {
        Self {
            payload,
            timestamp,
            requested_at: timestamp,
        }
    }

    pub fn age_millis(&self, now: i64) -> i64 {
        now - self.timestamp
    }

    /// Fresh iff `now - timestamp < window`.
    pub fn is_fresh(&self, now: i64, window: Duration) -> bool {
        let window = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        self.age_millis(now) < window
    }

    pub fn age_display(&self, now: i64) -> String {
        let minutes = self.age_millis(now) / 60_000;
        if minutes < 1 {
            // Also covers clock skew (negative ages)
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            let remaining_mins = minutes % 60;
            if remaining_mins >= 30 {
                // Round up: 1h 30m+ becomes 2h
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            let remaining_hours = (minutes % 1440) / 60;
            if remaining_hours >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

/// String-keyed blob storage. A single `set` is atomic with respect to
/// other calls on the same store.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: String) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    /// Drop every entry, e.g. when the signed-in account changes.
    fn clear(&self) -> Result<()>;
}

/// Lives as long as the process, like a browser tab's session storage.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Cache store lock poisoned"))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }
}

/// One JSON file per key under a directory, so entries survive between CLI runs.
pub struct FileCacheStore {
    cache_dir: PathBuf,
}

impl FileCacheStore {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory: {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    /// Escape everything but ASCII alphanumerics and '-', so distinct keys
    /// always map to distinct file names.
    fn file_name(key: &str) -> String {
        let mut name = String::with_capacity(key.len() + 5);
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                name.push(byte as char);
            } else {
                name.push_str(&format!("_{:02x}", byte));
            }
        }
        name.push_str(".json");
        name
    }

    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(Self::file_name(key))
    }
}

impl CacheStore for FileCacheStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.cache_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file for {}", key))?;
        Ok(Some(contents))
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        // Write-then-rename so readers never see a half-written entry.
        let path = self.cache_path(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).with_context(|| format!("Failed to write cache file for {}", key))?;
        std::fs::rename(&tmp, &path).with_context(|| format!("Failed to move cache file for {}", key))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.cache_path(key);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let entries = std::fs::read_dir(&self.cache_dir)
            .with_context(|| format!("Failed to list cache directory: {}", self.cache_dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json" || ext == "tmp") {
                std::fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove cache file: {}", path.display()))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freshness_boundary() {
        let entry = CachedData::new(vec![1], 1_000);
        let window = Duration::from_secs(120);
        assert!(entry.is_fresh(1_000 + 119_999, window));
        assert!(!entry.is_fresh(1_000 + 120_000, window));
    }

    #[test]
    fn test_age_display() {
        let entry = CachedData::new((), 0);
        assert_eq!(entry.age_display(30_000), "just now");
        assert_eq!(entry.age_display(-5_000), "just now");
        assert_eq!(entry.age_display(5 * 60_000), "5m ago");
        assert_eq!(entry.age_display(95 * 60_000), "2h ago");
        assert_eq!(entry.age_display(26 * 60 * 60_000), "1d ago");
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryCacheStore::new();
        assert!(store.is_empty());
        store.set("GET /ads", "[]".to_string()).expect("set");
        assert_eq!(store.get("GET /ads").expect("get").as_deref(), Some("[]"));
        store.remove("GET /ads").expect("remove");
        assert_eq!(store.get("GET /ads").expect("get"), None);
    }

    #[test]
    fn test_file_store_keys_do_not_collide() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileCacheStore::new(dir.path().to_path_buf()).expect("store");

        store.set("GET /ads?a=b", "1".to_string()).expect("set");
        store.set("GET /ads?a_b", "2".to_string()).expect("set");

        assert_eq!(store.get("GET /ads?a=b").expect("get").as_deref(), Some("1"));
        assert_eq!(store.get("GET /ads?a_b").expect("get").as_deref(), Some("2"));
        assert_eq!(store.get("GET /missing").expect("get"), None);
    }

    #[test]
    fn test_clear_empties_both_stores() {
        let memory = MemoryCacheStore::new();
        memory.set("GET /books", "[]".to_string()).expect("set");
        memory.clear().expect("clear");
        assert!(memory.is_empty());

        let dir = tempfile::tempdir().expect("tempdir");
        let files = FileCacheStore::new(dir.path().to_path_buf()).expect("store");
        files.set("GET /books", "[]".to_string()).expect("set");
        files.set("GET /ads?page=2", "[]".to_string()).expect("set");
        files.clear().expect("clear");

        assert_eq!(files.get("GET /books").expect("get"), None);
        assert_eq!(std::fs::read_dir(dir.path()).expect("list").count(), 0);
    }
}
