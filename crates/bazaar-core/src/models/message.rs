use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    #[serde(default)]
    pub ad_id: Option<i64>,
    #[serde(default)]
    pub ad_title: Option<String>,
    pub other_party: String,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub unread: u32,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub body: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
