use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub purchased: bool,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl Book {
    pub fn is_free(&self) -> bool {
        self.price <= 0.0
    }

    /// Whether the download endpoint should accept this user.
    pub fn can_download(&self) -> bool {
        self.purchased || self.is_free()
    }
}
