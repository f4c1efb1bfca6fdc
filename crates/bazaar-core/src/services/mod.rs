//! Typed marketplace endpoints.
//!
//! `Marketplace` bundles one `Caller` per client variant with the response
//! caches that list and detail views share. Endpoint groups live in
//! submodules as further `impl Marketplace` blocks:
//!
//! - `account`: login, logout, session restore
//! - `ads`: listing, detail, suggestions, posting
//! - `boost`: paid promotion
//! - `messages`: buyer/seller conversations
//! - `notifications`: the feed and the unread-count watcher
//! - `books`: digital book catalogue, downloads and uploads
//! - `wallet`: balance and withdrawals
//! - `admin`: news and newsletter management

pub mod account;
pub mod admin;
pub mod ads;
pub mod boost;
pub mod books;
pub mod messages;
pub mod notifications;
pub mod wallet;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use tracing::{debug, warn};

use crate::api::{ApiError, Caller, ClientFactory, ClientVariant, ListPage, NotifyPolicy};
use crate::auth::AuthContext;
use crate::cache::{CacheKey, CacheStore, CachedFetcher, Clock};
use crate::config::ApiConfig;
use crate::models::{Ad, AdQuery, Book, BoostPricing};
use crate::notify::Notifier;

pub use notifications::NotificationWatcher;

pub const AD_LIST_TTL: Duration = Duration::from_secs(180);
pub const AD_DETAIL_TTL: Duration = Duration::from_secs(300);
pub const BOOST_PRICING_TTL: Duration = Duration::from_secs(120);
pub const BOOK_LIST_TTL: Duration = Duration::from_secs(300);

/// One `Caller` per purpose. `background` shares the standard transport but
/// never notifies.
#[derive(Clone)]
pub struct Callers {
    pub standard: Arc<Caller>,
    pub slow: Arc<Caller>,
    pub upload: Arc<Caller>,
    pub background: Arc<Caller>,
}

impl Callers {
    pub fn from_factory(factory: &ClientFactory, notifier: Arc<dyn Notifier>) -> Result<Self, ApiError> {
        let standard = Arc::new(factory.transport(ClientVariant::Standard)?);
        Ok(Self {
            standard: Arc::new(Caller::new(
                standard.clone(),
                notifier.clone(),
                ClientVariant::Standard.policy(),
            )),
            slow: Arc::new(factory.caller(ClientVariant::Slow, notifier.clone())?),
            upload: Arc::new(factory.caller(ClientVariant::Upload, notifier.clone())?),
            background: Arc::new(Caller::new(standard, notifier, NotifyPolicy::Silent)),
        })
    }

    fn all(&self) -> [&Arc<Caller>; 4] {
        [&self.standard, &self.slow, &self.upload, &self.background]
    }
}

pub struct Marketplace {
    callers: Callers,
    auth: AuthContext,
    config: ApiConfig,
    store: Arc<dyn CacheStore>,
    ad_list: CachedFetcher<AdQuery, ListPage<Ad>>,
    ad_detail: CachedFetcher<i64, Ad>,
    boost_pricing: CachedFetcher<i64, BoostPricing>,
    book_list: CachedFetcher<(), Vec<Book>>,
}

impl Marketplace {
    pub fn new(
        factory: &ClientFactory,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ApiError> {
        let callers = Callers::from_factory(factory, notifier)?;
        Ok(Self::with_callers(
            callers,
            factory.auth().clone(),
            factory.config().clone(),
            store,
            clock,
        ))
    }

    pub fn with_callers(
        callers: Callers,
        auth: AuthContext,
        config: ApiConfig,
        store: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let ad_list = CachedFetcher::new(store.clone(), clock.clone(), AD_LIST_TTL, |q: &AdQuery| {
            CacheKey::new(&Method::GET, "/ads", &q.to_params())
        });
        let ad_detail = CachedFetcher::new(store.clone(), clock.clone(), AD_DETAIL_TTL, |id: &i64| {
            CacheKey::get(&format!("/ads/{}", id))
        });
        let boost_pricing = CachedFetcher::new(store.clone(), clock.clone(), BOOST_PRICING_TTL, |id: &i64| {
            CacheKey::get(&format!("/ads/{}/boost/pricing", id))
        });
        let book_list = CachedFetcher::new(store.clone(), clock, BOOK_LIST_TTL, |_: &()| CacheKey::get("/books"));

        Self {
            callers,
            auth,
            config,
            store,
            ad_list,
            ad_detail,
            boost_pricing,
            book_list,
        }
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn caller(&self, variant: ClientVariant) -> &Arc<Caller> {
        match variant {
            ClientVariant::Standard => &self.callers.standard,
            ClientVariant::Slow => &self.callers.slow,
            ClientVariant::Upload => &self.callers.upload,
        }
    }

    /// Cached responses belong to whoever was signed in when they were
    /// fetched; drop them all when that changes.
    fn forget_cached_responses(&self) {
        match self.store.clear() {
            Ok(()) => debug!("Response cache cleared"),
            Err(e) => warn!(error = %e, "Failed to clear response cache"),
        }
    }

    /// True while any user-initiated call is unsettled.
    pub fn is_loading(&self) -> bool {
        self.callers
            .all()
            .iter()
            .filter(|c| c.policy() != NotifyPolicy::Silent)
            .any(|c| c.is_loading())
    }
}
