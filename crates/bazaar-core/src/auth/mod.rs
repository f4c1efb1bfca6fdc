//! Authentication state.
//!
//! This module provides:
//! - `AuthContext`: the live credential slot every transport reads from
//! - `Session`: the token and user persisted between runs
//! - `CredentialStore`: optional OS-level password storage via keyring
//!
//! The login/logout/restore flow that moves tokens between these lives in
//! `services::account`.

pub mod context;
pub mod credentials;
pub mod session;

pub use context::AuthContext;
pub use credentials::CredentialStore;
pub use session::{Session, SessionData};
