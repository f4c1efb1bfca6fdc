use serde_json::json;
use tracing::{debug, info, warn};

use super::Marketplace;
use crate::api::{ApiError, ApiRequest, ItemEnvelope};
use crate::auth::{Session, SessionData};
use crate::models::{LoginResponse, User};

impl Marketplace {
    /// Exchange credentials for a token. On success the token is live for
    /// every subsequent request; persisting it is up to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionData, ApiError> {
        let request = ApiRequest::post("/auth/login").json(&json!({
            "email": email.trim(),
            "password": password,
        }))?;
        let response: LoginResponse = self.callers.standard.send_json(request).await?;

        self.forget_cached_responses();
        self.auth.set_token(response.token.clone());
        info!(user_id = response.user.id, "Logged in");
        Ok(SessionData::new(response.token, response.user))
    }

    /// Tell the backend, then drop the token whatever it answered.
    pub async fn logout(&self) {
        if self.auth.is_authenticated() {
            if let Err(e) = self.callers.background.send(ApiRequest::post("/auth/logout")).await {
                debug!(error = %e, "Server-side logout failed");
            }
        }
        self.auth.clear();
        self.forget_cached_responses();
        info!("Logged out");
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        let envelope: ItemEnvelope<User> = self.callers.standard.send_json(ApiRequest::get("/auth/me")).await?;
        Ok(envelope.into_inner())
    }

    /// Bring a stored session back to life. The token is checked against
    /// `/auth/me` once; any failure signs the user out and deletes the
    /// session file.
    pub async fn restore(&self, session: &mut Session) -> Option<User> {
        session.token()?;
        session.apply_to(&self.auth);

        let result: Result<ItemEnvelope<User>, ApiError> =
            self.callers.background.send_json(ApiRequest::get("/auth/me")).await;
        match result {
            Ok(envelope) => {
                let user = envelope.into_inner();
                if let Some(data) = session.data.as_mut() {
                    data.user = user.clone();
                }
                if let Err(e) = session.save() {
                    warn!(error = %e, "Failed to refresh session file");
                }
                debug!(user_id = user.id, "Session restored");
                Some(user)
            }
            Err(e) => {
                info!(error = %e, "Stored session rejected, signing out");
                self.auth.clear();
                self.forget_cached_responses();
                if let Err(e) = session.clear() {
                    warn!(error = %e, "Failed to remove session file");
                }
                None
            }
        }
    }
}
