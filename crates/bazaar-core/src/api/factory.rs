use std::sync::Arc;
use std::time::Duration;

use super::caller::{Caller, NotifyPolicy};
use super::transport::ReqwestTransport;
use super::ApiError;
use crate::auth::AuthContext;
use crate::config::{ApiConfig, SLOW_TIMEOUT, STANDARD_TIMEOUT, UPLOAD_TIMEOUT};
use crate::notify::Notifier;

/// Transport flavours. Each has a fixed timeout and notification policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientVariant {
    Standard,
    /// Slow or frequently throttled endpoints; 429 is left to the caller.
    Slow,
    /// Large multipart uploads.
    Upload,
}

impl ClientVariant {
    pub fn timeout(self) -> Duration {
        match self {
            ClientVariant::Standard => STANDARD_TIMEOUT,
            ClientVariant::Slow => SLOW_TIMEOUT,
            ClientVariant::Upload => UPLOAD_TIMEOUT,
        }
    }

    pub fn policy(self) -> NotifyPolicy {
        match self {
            ClientVariant::Slow => NotifyPolicy::SuppressRateLimit,
            ClientVariant::Standard | ClientVariant::Upload => NotifyPolicy::Always,
        }
    }
}

/// Builds transports and callers bound to one API config and credential slot.
#[derive(Clone, Debug)]
pub struct ClientFactory {
    config: ApiConfig,
    auth: AuthContext,
}

impl ClientFactory {
    pub fn new(config: ApiConfig, auth: AuthContext) -> Self {
        Self { config, auth }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn transport(&self, variant: ClientVariant) -> Result<ReqwestTransport, ApiError> {
        ReqwestTransport::new(self.config.clone(), self.auth.clone(), variant.timeout())
    }

    pub fn caller(&self, variant: ClientVariant, notifier: Arc<dyn Notifier>) -> Result<Caller, ApiError> {
        let transport = self.transport(variant)?;
        Ok(Caller::new(Arc::new(transport), notifier, variant.policy()))
    }
}
