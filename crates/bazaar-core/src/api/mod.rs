//! REST API access for the marketplace backend.
//!
//! This module provides the pieces every request flows through:
//! `ClientFactory` builds a `ReqwestTransport` per `ClientVariant`, and a
//! `Caller` wraps a transport with loading state and failure notification.
//!
//! Authenticated requests carry `Authorization: Bearer <token>`, read from
//! the shared `AuthContext` on every send.

pub mod caller;
pub mod envelope;
pub mod error;
pub mod factory;
pub mod transport;

pub use caller::{Caller, NotifyPolicy};
pub use envelope::{ItemEnvelope, ListEnvelope, ListPage};
pub use error::ApiError;
pub use factory::{ClientFactory, ClientVariant};
pub use transport::{ApiRequest, ApiResponse, FormPart, RequestBody, ReqwestTransport, Transport};
