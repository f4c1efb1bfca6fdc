//! Optional password memory for `login --remember`.
//!
//! Only the password goes to the OS keychain; the account email is kept in
//! the plain config file as the last username. Keychain accounts are keyed
//! by the normalized email, so `Ama@Example.com ` and `ama@example.com`
//! share one entry.

use anyhow::{Context, Result};
use keyring::Entry;
use tracing::debug;

/// Keychain service every marketplace password is filed under.
const KEYCHAIN_SERVICE: &str = "bazaar-marketplace";

pub struct CredentialStore;

impl CredentialStore {
    pub fn store(email: &str, password: &str) -> Result<()> {
        Self::entry(email)?
            .set_password(password)
            .context("Failed to save password to the keychain")?;
        debug!(account = %Self::account(email), "Password remembered");
        Ok(())
    }

    pub fn get_password(email: &str) -> Result<String> {
        Self::entry(email)?
            .get_password()
            .context("No remembered password for this account")
    }

    /// Forgetting an account that was never remembered is not an error.
    pub fn delete(email: &str) -> Result<()> {
        match Self::entry(email)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to remove password from the keychain"),
        }
    }

    fn entry(email: &str) -> Result<Entry> {
        let account = Self::account(email);
        if account.is_empty() {
            anyhow::bail!("An email address is required to use the keychain");
        }
        Entry::new(KEYCHAIN_SERVICE, &account).context("Keychain is unavailable")
    }

    /// Email addresses are case-insensitive for sign-in.
    fn account(email: &str) -> String {
        email.trim().to_lowercase()
    }
}
