use tracing::{debug, info};

use super::Marketplace;
use crate::api::{ApiError, ApiRequest, ListEnvelope};
use crate::cancel::CancelToken;
use crate::models::{AppNotification, UnreadCount};
use crate::poll::{PollPolicy, Poller};

impl Marketplace {
    pub async fn notifications(&self) -> Result<Vec<AppNotification>, ApiError> {
        let envelope: ListEnvelope<AppNotification> =
            self.callers.standard.send_json(ApiRequest::get("/notifications")).await?;
        Ok(envelope.into_page(0).items)
    }

    pub async fn unread_count(&self) -> Result<UnreadCount, ApiError> {
        self.callers
            .standard
            .send_json(ApiRequest::get("/notifications/unread-count"))
            .await
    }

    /// Same request, but failures never reach the notifier.
    async fn unread_count_quietly(&self) -> Result<UnreadCount, ApiError> {
        self.callers
            .background
            .send_json(ApiRequest::get("/notifications/unread-count"))
            .await
    }

    pub async fn mark_read(&self, id: i64) -> Result<(), ApiError> {
        self.callers
            .standard
            .send(ApiRequest::post(format!("/notifications/{}/read", id)))
            .await?;
        Ok(())
    }
}

/// Keeps the bell-icon count current while someone is signed in.
#[derive(Default)]
pub struct NotificationWatcher {
    poller: Poller,
}

impl NotificationWatcher {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            poller: Poller::new(policy),
        }
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    /// The user opened the notification panel: refresh now.
    pub fn open(&self) {
        self.poller.trigger();
    }

    /// Poll until `cancel` fires or the session ends. Returns at once when
    /// nobody is signed in.
    pub async fn run(&self, market: &Marketplace, cancel: &CancelToken, on_count: impl FnMut(UnreadCount)) {
        let auth = market.auth();
        if !auth.is_authenticated() {
            debug!("Not signed in, notification polling skipped");
            return;
        }

        let stop = CancelToken::new();
        let stopper = async {
            tokio::select! {
                _ = auth.signed_out() => info!("Signed out, stopping notification polling"),
                _ = cancel.cancelled() => debug!("Notification polling cancelled"),
                _ = stop.cancelled() => {}
            }
            stop.cancel();
        };
        let polling = async {
            self.poller.run(&stop, || market.unread_count_quietly(), on_count).await;
            stop.cancel();
        };

        tokio::join!(stopper, polling);
    }
}
