use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An entry in the user's notification feed (not to be confused with toasts).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppNotification {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, alias = "is_read")]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UnreadCount {
    #[serde(alias = "count", alias = "unread_count")]
    pub unread: u64,
}
