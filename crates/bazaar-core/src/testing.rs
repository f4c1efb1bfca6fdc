//! Network-free fakes shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::api::{ApiError, ApiRequest, ApiResponse, Caller, NotifyPolicy, Transport};
use crate::auth::AuthContext;
use crate::cache::{ManualClock, MemoryCacheStore};
use crate::config::ApiConfig;
use crate::notify::{Notification, Notifier};
use crate::services::{Callers, Marketplace};

/// Replies with queued outcomes in order and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<ApiResponse, ApiError>>>,
    requests: Mutex<Vec<ApiRequest>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, reply: Result<ApiResponse, ApiError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn push_json(&self, value: serde_json::Value) {
        self.push(Ok(ApiResponse {
            status: 200,
            body: serde_json::to_vec(&value).unwrap(),
        }));
    }

    pub fn push_bytes(&self, bytes: &[u8]) {
        self.push(Ok(ApiResponse {
            status: 200,
            body: bytes.to_vec(),
        }));
    }

    pub fn push_error(&self, status: u16, body: &str) {
        self.push(Err(ApiError::from_status(status, body)));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::NetworkError("no scripted reply".to_string())))
    }
}

/// Holds the single request open until the test releases it.
pub struct GatedTransport {
    gate: Mutex<Option<oneshot::Receiver<Result<ApiResponse, ApiError>>>>,
}

impl GatedTransport {
    pub fn new() -> (Self, oneshot::Sender<Result<ApiResponse, ApiError>>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                gate: Mutex::new(Some(rx)),
            },
            tx,
        )
    }
}

#[async_trait]
impl Transport for GatedTransport {
    async fn send(&self, _request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let rx = self.gate.lock().unwrap().take();
        match rx {
            Some(rx) => rx.await.unwrap_or(Err(ApiError::Cancelled)),
            None => Err(ApiError::NetworkError("gate already used".to_string())),
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.seen.lock().unwrap().iter().map(|n| n.message.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

pub struct PanickingNotifier;

impl Notifier for PanickingNotifier {
    fn notify(&self, _notification: Notification) {
        panic!("notifier failed");
    }
}

/// A caller over a fresh scripted transport, with handles to both fakes.
pub fn scripted_caller(policy: NotifyPolicy) -> (Arc<Caller>, Arc<ScriptedTransport>, Arc<RecordingNotifier>) {
    let transport = Arc::new(ScriptedTransport::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let caller = Arc::new(Caller::new(transport.clone(), notifier.clone(), policy));
    (caller, transport, notifier)
}

/// A `Marketplace` whose callers all share one scripted transport.
pub struct MarketHarness {
    pub market: Marketplace,
    pub transport: Arc<ScriptedTransport>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryCacheStore>,
}

impl MarketHarness {
    /// Signed in as "test-token".
    pub fn new() -> Self {
        let transport = Arc::new(ScriptedTransport::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let caller = |policy| Arc::new(Caller::new(transport.clone(), notifier.clone(), policy));
        let callers = Callers {
            standard: caller(NotifyPolicy::Always),
            slow: caller(NotifyPolicy::SuppressRateLimit),
            upload: caller(NotifyPolicy::Always),
            background: caller(NotifyPolicy::Silent),
        };

        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let store = Arc::new(MemoryCacheStore::new());
        let market = Marketplace::with_callers(
            callers,
            AuthContext::with_token("test-token"),
            ApiConfig::new("http://api.test", "http://app.test"),
            store.clone(),
            clock.clone(),
        );

        Self {
            market,
            transport,
            notifier,
            clock,
            store,
        }
    }

    pub fn paths(&self) -> Vec<String> {
        self.transport.requests().into_iter().map(|r| r.path).collect()
    }
}
