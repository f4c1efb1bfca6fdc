//! The request wrapper every view and service talks to the backend through.
//!
//! A `Caller` owns an in-flight counter, dispatches through its `Transport`,
//! and on failure emits exactly one notification (subject to its
//! `NotifyPolicy`) before handing the error back to the caller for local
//! recovery.

use std::sync::Arc;

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::transport::{apply_status_messages, ApiRequest, ApiResponse, RequestBody, Transport};
use super::ApiError;
use crate::cancel::CancelToken;
use crate::notify::{Notification, Notifier};

/// Which failures reach the notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyPolicy {
    /// Every failure except cancellation.
    Always,
    /// Like `Always`, but 429 responses are left to the caller to present.
    SuppressRateLimit,
    /// Failures are logged only. For background work the user did not ask for.
    Silent,
}

/// Decrements the in-flight count when dropped, including during unwinding.
struct InFlightGuard<'a> {
    count: &'a watch::Sender<usize>,
}

impl<'a> InFlightGuard<'a> {
    fn enter(count: &'a watch::Sender<usize>) -> Self {
        count.send_modify(|n| *n += 1);
        Self { count }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.count.send_modify(|n| *n = n.saturating_sub(1));
    }
}

pub struct Caller {
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    policy: NotifyPolicy,
    in_flight: watch::Sender<usize>,
}

impl Caller {
    pub fn new(transport: Arc<dyn Transport>, notifier: Arc<dyn Notifier>, policy: NotifyPolicy) -> Self {
        let (in_flight, _rx) = watch::channel(0);
        Self {
            transport,
            notifier,
            policy,
            in_flight,
        }
    }

    pub fn policy(&self) -> NotifyPolicy {
        self.policy
    }

    /// True while at least one call through this wrapper is unsettled.
    pub fn is_loading(&self) -> bool {
        *self.in_flight.borrow() > 0
    }

    /// Watch the number of unsettled calls, e.g. to drive a spinner.
    pub fn loading(&self) -> watch::Receiver<usize> {
        self.in_flight.subscribe()
    }

    /// Issue a request and return the decoded JSON body.
    pub async fn call_api(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
        headers: Option<HeaderMap>,
    ) -> Result<serde_json::Value, ApiError> {
        let mut request = ApiRequest::new(method, path).body(body.unwrap_or_default());
        if let Some(headers) = headers {
            request = request.headers(headers);
        }
        self.send_json(request).await
    }

    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.run(request, None, Ok).await
    }

    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        self.run(request, None, |response| response.json()).await
    }

    /// Raw response bytes, for downloads.
    pub async fn send_bytes(&self, request: ApiRequest) -> Result<Vec<u8>, ApiError> {
        self.run(request, None, |response| Ok(response.body)).await
    }

    /// Like `send_json`, but gives up with `ApiError::Cancelled` once `cancel` fires.
    pub async fn send_cancellable<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        cancel: &CancelToken,
    ) -> Result<T, ApiError> {
        self.run(request, Some(cancel), |response| response.json()).await
    }

    async fn run<T>(
        &self,
        mut request: ApiRequest,
        cancel: Option<&CancelToken>,
        decode: impl FnOnce(ApiResponse) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let _guard = InFlightGuard::enter(&self.in_flight);
        let overrides = std::mem::take(&mut request.status_messages);
        let handled = std::mem::take(&mut request.handled_statuses);
        let method = request.method.clone();
        let path = request.path.clone();

        let outcome = match cancel {
            Some(token) if token.is_cancelled() => Err(ApiError::Cancelled),
            Some(token) => {
                tokio::select! {
                    result = self.transport.send(request) => result,
                    _ = token.cancelled() => Err(ApiError::Cancelled),
                }
            }
            None => self.transport.send(request).await,
        };

        match outcome.and_then(decode) {
            Ok(value) => Ok(value),
            Err(error) => {
                let error = apply_status_messages(&overrides, error);
                if error.status().is_some_and(|status| handled.contains(&status)) {
                    debug!(%method, path, status = ?error.status(), "Failure left to caller");
                } else {
                    self.report(&method, &path, &error);
                }
                Err(error)
            }
        }
    }

    fn report(&self, method: &Method, path: &str, error: &ApiError) {
        if matches!(error, ApiError::Cancelled) {
            debug!(%method, path, "Request cancelled");
            return;
        }
        if error.is_rate_limited() && self.policy == NotifyPolicy::SuppressRateLimit {
            debug!(%method, path, "Rate limited, leaving presentation to caller");
            return;
        }
        if self.policy == NotifyPolicy::Silent {
            debug!(%method, path, error = %error, "Background call failed");
            return;
        }
        warn!(%method, path, status = ?error.status(), error = %error, "API call failed");
        self.notifier.notify(Notification::error(error.user_message()));
    }
}
