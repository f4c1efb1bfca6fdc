//! Fixed-interval polling with failure backoff.
//!
//! A `Poller` fetches once immediately, then again every interval, or right
//! away when `trigger` is called (e.g. the user opens the notification
//! panel). Failures are logged, never surfaced, and stretch the next delay:
//!
//! ```text
//! Idle --tick--> Fetching --ok--> Idle
//!                    |
//!                    +--err--> Backoff(n) --tick--> Fetching
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tracing::{debug, warn};

use crate::api::ApiError;
use crate::cancel::CancelToken;

/// Default time between polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Longest delay after repeated failures.
pub const MAX_BACKOFF: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Fetching,
    Backoff { failures: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_backoff: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            max_backoff: MAX_BACKOFF,
        }
    }
}

impl PollPolicy {
    /// `interval` after success, `interval * 2^n` (capped) after n straight failures.
    pub fn delay_after(&self, state: PollState) -> Duration {
        match state {
            PollState::Backoff { failures } => {
                let factor = 2u32.saturating_pow(failures);
                self.interval.saturating_mul(factor).min(self.max_backoff)
            }
            PollState::Idle | PollState::Fetching => self.interval,
        }
    }
}

pub struct Poller {
    policy: PollPolicy,
    state: watch::Sender<PollState>,
    trigger: Arc<Notify>,
}

impl Default for Poller {
    fn default() -> Self {
        Self::new(PollPolicy::default())
    }
}

impl Poller {
    pub fn new(policy: PollPolicy) -> Self {
        let (state, _rx) = watch::channel(PollState::Idle);
        Self {
            policy,
            state,
            trigger: Arc::new(Notify::new()),
        }
    }

    pub fn state(&self) -> PollState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state.subscribe()
    }

    /// Poll now instead of waiting out the current delay. A trigger that
    /// arrives mid-fetch is remembered and honoured right after it.
    pub fn trigger(&self) {
        self.trigger.notify_one();
    }

    /// Run until `cancel` fires. A fetch in flight at that moment is dropped
    /// and its result never reaches `on_result`.
    pub async fn run<T, F, Fut>(&self, cancel: &CancelToken, mut fetch: F, mut on_result: impl FnMut(T))
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut failures: u32 = 0;

        while !cancel.is_cancelled() {
            self.state.send_replace(PollState::Fetching);
            let outcome = tokio::select! {
                result = fetch() => result,
                _ = cancel.cancelled() => break,
            };

            match outcome {
                Ok(value) => {
                    failures = 0;
                    self.state.send_replace(PollState::Idle);
                    on_result(value);
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    warn!(error = %e, failures, "Background poll failed");
                    self.state.send_replace(PollState::Backoff { failures });
                }
            }

            let delay = self.policy.delay_after(self.state());
            debug!(delay_secs = delay.as_secs(), "Next poll scheduled");
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.trigger.notified() => debug!("Poll triggered manually"),
                _ = cancel.cancelled() => break,
            }
        }

        self.state.send_replace(PollState::Idle);
        debug!("Poller stopped");
    }
}
