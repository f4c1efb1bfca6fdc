use thiserror::Error;

/// Shown when neither the server nor the transport produced a usable message.
pub const FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";

/// Status code the backend uses to signal throttling.
pub const RATE_LIMIT_STATUS: u16 = 429;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Unauthorized - token may be expired")]
    Unauthorized { message: Option<String> },

    #[error("Access denied")]
    AccessDenied { message: Option<String> },

    #[error("Resource not found")]
    NotFound { message: Option<String> },

    #[error("Rate limited - please wait before retrying")]
    RateLimited { message: Option<String> },

    #[error("Request failed with status code {status}")]
    ServerError { status: u16, message: Option<String> },

    #[error("Request failed with status code {status}")]
    Status { status: u16, message: Option<String> },

    #[error("Request timed out")]
    Timeout,

    #[error("{0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request cancelled")]
    Cancelled,
}

/// Maximum length for error response bodies in log output
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull the `message` field out of a JSON error envelope, if there is one.
    pub fn extract_message(body: &str) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        value
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    }

    pub fn from_status(status: u16, body: &str) -> Self {
        let message = Self::extract_message(body);
        match status {
            401 => ApiError::Unauthorized { message },
            403 => ApiError::AccessDenied { message },
            404 => ApiError::NotFound { message },
            RATE_LIMIT_STATUS => ApiError::RateLimited { message },
            500..=599 => ApiError::ServerError { status, message },
            _ => ApiError::Status { status, message },
        }
    }

    /// HTTP status code, when a response was received at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::AccessDenied { .. } => Some(403),
            ApiError::NotFound { .. } => Some(404),
            ApiError::RateLimited { .. } => Some(RATE_LIMIT_STATUS),
            ApiError::ServerError { status, .. } | ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. })
    }

    /// The message the server put in the error body.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message }
            | ApiError::AccessDenied { message }
            | ApiError::NotFound { message }
            | ApiError::RateLimited { message }
            | ApiError::ServerError { message, .. }
            | ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Human-readable text for notifications: server message, then the
    /// transport's own message, then a generic fallback.
    pub fn user_message(&self) -> String {
        if let Some(message) = self.server_message() {
            return message.to_string();
        }
        let transport = self.to_string();
        if transport.trim().is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            transport
        }
    }

    /// Replace the server message, keeping the variant and status.
    pub fn with_message(self, text: impl Into<String>) -> Self {
        let message = Some(text.into());
        match self {
            ApiError::Unauthorized { .. } => ApiError::Unauthorized { message },
            ApiError::AccessDenied { .. } => ApiError::AccessDenied { message },
            ApiError::NotFound { .. } => ApiError::NotFound { message },
            ApiError::RateLimited { .. } => ApiError::RateLimited { message },
            ApiError::ServerError { status, .. } => ApiError::ServerError { status, message },
            ApiError::Status { status, .. } => ApiError::Status { status, message },
            other => other,
        }
    }
}
