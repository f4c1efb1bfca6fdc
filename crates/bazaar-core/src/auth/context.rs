use std::sync::Arc;

use tokio::sync::watch;

/// The single credential slot shared by every transport.
///
/// Cloning is cheap and all clones observe the same token. The slot is passed
/// explicitly to the transports that read it; nothing looks it up globally.
#[derive(Clone, Debug)]
pub struct AuthContext {
    token: Arc<watch::Sender<Option<String>>>,
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthContext {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { token: Arc::new(tx) }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let ctx = Self::new();
        ctx.set_token(token);
        ctx
    }

    pub fn set_token(&self, token: impl Into<String>) {
        self.token.send_replace(Some(token.into()));
    }

    pub fn clear(&self) {
        self.token.send_replace(None);
    }

    pub fn token(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.token.subscribe()
    }

    /// Resolves once the slot is empty. Returns immediately when signed out.
    pub async fn signed_out(&self) {
        let mut rx = self.token.subscribe();
        // The sender lives in self, so the channel cannot close while we wait.
        let _ = rx.wait_for(|token| token.is_none()).await;
    }
}
