//! Response caching for list and detail data.
//!
//! This module provides the `CachedFetcher` that every cached call site goes
//! through, instead of each one re-implementing the read/compare/write dance.
//! Entries are timestamped JSON blobs; freshness is decided per call site by
//! its window.
//!
//! Windows in use:
//! - Boost pricing: 2 minutes
//! - Ad listings: 3 minutes
//! - Ad detail and book catalogue: 5 minutes

pub mod clock;
pub mod fetcher;
pub mod key;
pub mod manager;

pub use clock::{Clock, ManualClock, SystemClock};
pub use fetcher::{CachedFetcher, FetchSource, Fetched};
pub use key::CacheKey;
pub use manager::{CacheStore, CachedData, FileCacheStore, MemoryCacheStore};
