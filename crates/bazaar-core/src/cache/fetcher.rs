use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{CacheKey, CacheStore, CachedData, Clock};
use crate::api::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    /// Fetched just now.
    Network,
    /// Served from a fresh entry without a request.
    Cache,
    /// The refetch was throttled; an expired entry stood in.
    StaleFallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<V> {
    pub value: V,
    pub source: FetchSource,
    /// When the value was stored (epoch millis).
    pub cached_at: i64,
}

impl<V> Fetched<V> {
    pub fn is_stale_fallback(&self) -> bool {
        self.source == FetchSource::StaleFallback
    }

    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> Fetched<U> {
        Fetched {
            value: f(self.value),
            source: self.source,
            cached_at: self.cached_at,
        }
    }
}

/// Only the stamp, for comparing against an incoming write without knowing `V`.
#[derive(Deserialize)]
struct EntryStamp {
    #[serde(default)]
    requested_at: i64,
}

/// Read-through cache for one kind of resource: one TTL, one key function.
pub struct CachedFetcher<K: ?Sized, V> {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    key_fn: Box<dyn Fn(&K) -> CacheKey + Send + Sync>,
    _value: PhantomData<fn() -> V>,
}

impl<K: ?Sized, V> CachedFetcher<K, V>
where
    V: Serialize + DeserializeOwned,
{
    pub fn new(
        store: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        key_fn: impl Fn(&K) -> CacheKey + Send + Sync + 'static,
    ) -> Self {
        Self {
            store,
            clock,
            ttl,
            key_fn: Box::new(key_fn),
            _value: PhantomData,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn key(&self, key: &K) -> CacheKey {
        (self.key_fn)(key)
    }

    /// Serve a fresh entry, or run `fetch` and store its result. When `fetch`
    /// is rate limited and any entry exists, however old, that entry is
    /// returned instead of the error.
    pub async fn get_or_fetch<F, Fut>(&self, key: &K, fetch: F) -> Result<Fetched<V>, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, ApiError>>,
    {
        let key = self.key(key);
        let requested_at = self.clock.now_millis();

        let cached = match self.read(&key) {
            Some(entry) if entry.is_fresh(requested_at, self.ttl) => {
                debug!(key = %key, age_ms = entry.age_millis(requested_at), "Cache hit");
                return Ok(Fetched {
                    value: entry.payload,
                    source: FetchSource::Cache,
                    cached_at: entry.timestamp,
                });
            }
            other => other,
        };

        match fetch().await {
            Ok(value) => {
                let stored_at = self.clock.now_millis();
                self.write(&key, &value, stored_at, requested_at);
                Ok(Fetched {
                    value,
                    source: FetchSource::Network,
                    cached_at: stored_at,
                })
            }
            Err(error) if error.is_rate_limited() => match cached {
                Some(entry) => {
                    warn!(key = %key, "Rate limited, serving expired cache entry");
                    Ok(Fetched {
                        value: entry.payload,
                        source: FetchSource::StaleFallback,
                        cached_at: entry.timestamp,
                    })
                }
                None => Err(error),
            },
            Err(error) => Err(error),
        }
    }

    /// The stored entry regardless of age.
    pub fn peek(&self, key: &K) -> Option<CachedData<V>> {
        self.read(&self.key(key))
    }

    pub fn invalidate(&self, key: &K) {
        let key = self.key(key);
        if let Err(e) = self.store.remove(key.as_str()) {
            warn!(key = %key, error = %e, "Failed to invalidate cache entry");
        }
    }

    /// Unreadable entries are logged and treated as absent.
    fn read(&self, key: &CacheKey) -> Option<CachedData<V>> {
        let raw = match self.store.get(key.as_str()) {
            Ok(raw) => raw?,
            Err(e) => {
                debug!(key = %key, error = %e, "Failed to read cache entry");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(key = %key, error = %e, "Failed to parse cache entry");
                None
            }
        }
    }

    /// Drops the write if the stored entry came from a later-dispatched request.
    fn write(&self, key: &CacheKey, value: &V, stored_at: i64, requested_at: i64) {
        if let Ok(Some(raw)) = self.store.get(key.as_str()) {
            if let Ok(existing) = serde_json::from_str::<EntryStamp>(&raw) {
                if existing.requested_at > requested_at {
                    debug!(key = %key, "Newer response already cached, dropping write");
                    return;
                }
            }
        }

        let entry = CachedData {
            payload: value,
            timestamp: stored_at,
            requested_at,
        };
        let result = serde_json::to_string(&entry)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.store.set(key.as_str(), json));
        if let Err(e) = result {
            warn!(key = %key, error = %e, "Failed to write cache entry");
        }
    }
}
