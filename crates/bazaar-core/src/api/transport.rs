//! Request/response types and the HTTP transport behind every `Caller`.
//!
//! `ReqwestTransport` is bound to a base URL and a fixed timeout at
//! construction. The bearer token is read from the `AuthContext` on every
//! send, so a login or logout takes effect on the next request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{multipart, Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::ApiError;
use crate::auth::AuthContext;
use crate::config::ApiConfig;

/// A single multipart form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        filename: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        FormPart::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FormPart::Text { name, .. } | FormPart::File { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    None,
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

impl RequestBody {
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(RequestBody::Json)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to encode request body: {}", e)))
    }
}

/// Everything needed to issue one call, relative to the transport's base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub headers: HeaderMap,
    /// Overrides the transport's timeout for this request only.
    pub timeout: Option<Duration>,
    /// Fixed user-facing messages for specific failure statuses.
    pub status_messages: Vec<(u16, String)>,
    /// Failure statuses the issuing code presents itself; never notified.
    pub handled_statuses: Vec<u16>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::None,
            headers: HeaderMap::new(),
            timeout: None,
            status_messages: Vec::new(),
            handled_statuses: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, params: Vec<(String, String)>) -> Self {
        self.query = params;
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn json<T: Serialize>(self, value: &T) -> Result<Self, ApiError> {
        Ok(self.body(RequestBody::json(value)?))
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn on_status(mut self, status: u16, message: impl Into<String>) -> Self {
        self.status_messages.push((status, message.into()));
        self
    }

    /// Leave failures with `status` to the code that issued the request.
    pub fn handles_status(mut self, status: u16) -> Self {
        self.handled_statuses.push(status);
        self
    }

    /// Apply any per-status message override to a failure.
    pub fn annotate(&self, error: ApiError) -> ApiError {
        apply_status_messages(&self.status_messages, error)
    }
}

pub(crate) fn apply_status_messages(overrides: &[(u16, String)], error: ApiError) -> ApiError {
    let Some(status) = error.status() else {
        return error;
    };
    match overrides.iter().find(|(s, _)| *s == status) {
        Some((_, message)) => error.with_message(message.clone()),
        None => error,
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        // An empty body deserializes as JSON null.
        let bytes: &[u8] = if self.body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &self.body
        };
        serde_json::from_slice(bytes)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON response: {}", e)))
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// reqwest-backed transport. Clone is cheap - reqwest::Client uses Arc internally.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    config: ApiConfig,
    auth: AuthContext,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(config: ApiConfig, auth: AuthContext, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::NetworkError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            config,
            auth,
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build the outgoing request from (config, credential, request).
    pub fn prepare(&self, request: &ApiRequest, token: Option<&str>) -> Result<reqwest::Request, ApiError> {
        let url = self.config.url_for(&request.path);
        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header(header::ACCEPT, HeaderValue::from_static("application/json"))
            .timeout(request.timeout.unwrap_or(self.timeout));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        builder = match &request.body {
            RequestBody::None => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(Self::build_form(parts)?),
        };

        // Caller-supplied headers win over the defaults above.
        builder = builder.headers(request.headers.clone());

        builder
            .build()
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to build request to {}: {}", url, e)))
    }

    fn build_form(parts: &[FormPart]) -> Result<multipart::Form, ApiError> {
        let mut form = multipart::Form::new();
        for part in parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
                FormPart::File {
                    name,
                    filename,
                    mime,
                    bytes,
                } => {
                    let file = multipart::Part::bytes(bytes.clone())
                        .file_name(filename.clone())
                        .mime_str(mime)
                        .map_err(|e| ApiError::InvalidResponse(format!("Invalid MIME type {}: {}", mime, e)))?;
                    form.part(name.clone(), file)
                }
            };
        }
        Ok(form)
    }

    fn map_send_error(error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::NetworkError(error.to_string())
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let token = self.auth.token();
        let outgoing = self.prepare(&request, token.as_deref())?;
        debug!(method = %request.method, path = %request.path, authenticated = token.is_some(), "Sending request");

        let response = self.client.execute(outgoing).await.map_err(Self::map_send_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(Self::map_send_error)?.to_vec();

        if status.is_success() {
            Ok(ApiResponse {
                status: status.as_u16(),
                body,
            })
        } else {
            let text = String::from_utf8_lossy(&body);
            warn!(
                method = %request.method,
                path = %request.path,
                status = status.as_u16(),
                body = %ApiError::truncate_body(&text),
                "Request failed"
            );
            Err(ApiError::from_status(status.as_u16(), &text))
        }
    }
}
