//! Core library for the Bazaar classified-ads marketplace client.
//!
//! This crate contains everything the front ends share:
//!
//! - `api`: transport factory, the `Caller` request wrapper and its error type
//! - `auth`: the explicit credential slot, persisted sessions, keychain storage
//! - `cache`: timestamped response caching with per-call-site windows
//! - `poll`: fixed-interval polling with failure backoff
//! - `services`: typed marketplace endpoints built on the above
//! - `models`: data structures returned by the backend

pub mod api;
pub mod auth;
pub mod cache;
pub mod cancel;
pub mod config;
pub mod models;
pub mod notify;
pub mod poll;
pub mod search;
pub mod services;
pub mod upload;
pub mod utils;

#[cfg(test)]
mod testing;

pub use api::{ApiError, Caller, ClientFactory, ClientVariant};
pub use auth::{AuthContext, Session};
pub use cache::{CacheKey, CachedFetcher};
pub use cancel::CancelToken;
pub use config::{ApiConfig, Config};
pub use notify::{ActionError, InlineAlert, Notification, Notifier};
pub use services::Marketplace;
