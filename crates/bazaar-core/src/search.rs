//! Debounced search-as-you-type suggestions.
//!
//! Keystrokes arrive on a channel. Only the latest query after a quiet period
//! is fetched, and a fetch still in flight when the user types again is
//! dropped, so suggestions never arrive out of order.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::ApiError;

pub const DEBOUNCE: Duration = Duration::from_millis(300);

/// Shorter queries clear the suggestion list without a request.
pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestions {
    pub query: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct SuggestionDebouncer {
    quiet: Duration,
    min_chars: usize,
}

impl Default for SuggestionDebouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE, MIN_QUERY_CHARS)
    }
}

impl SuggestionDebouncer {
    pub fn new(quiet: Duration, min_chars: usize) -> Self {
        Self { quiet, min_chars }
    }

    /// Runs until either channel closes. Fetch failures are logged only.
    pub async fn run<F, Fut>(
        &self,
        mut queries: mpsc::Receiver<String>,
        out: mpsc::Sender<Suggestions>,
        mut fetch: F,
    ) where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<Vec<String>, ApiError>>,
    {
        let mut next = queries.recv().await;

        while let Some(mut query) = next.take() {
            // Restart the quiet period on every keystroke.
            loop {
                match tokio::time::timeout(self.quiet, queries.recv()).await {
                    Ok(Some(newer)) => query = newer,
                    Ok(None) => return,
                    Err(_) => break,
                }
            }

            let term = query.trim().to_string();
            if term.chars().count() < self.min_chars {
                let cleared = Suggestions {
                    query: term,
                    items: Vec::new(),
                };
                if out.send(cleared).await.is_err() {
                    return;
                }
                next = queries.recv().await;
                continue;
            }

            tokio::select! {
                result = fetch(term.clone()) => {
                    match result {
                        Ok(items) => {
                            debug!(query = %term, count = items.len(), "Suggestions fetched");
                            if out.send(Suggestions { query: term, items }).await.is_err() {
                                return;
                            }
                        }
                        Err(e) => warn!(query = %term, error = %e, "Suggestion fetch failed"),
                    }
                    next = queries.recv().await;
                }
                newer = queries.recv() => {
                    debug!(query = %term, "Suggestion fetch superseded");
                    next = newer;
                }
            }
        }
    }
}
