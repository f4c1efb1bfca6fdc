use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::format_money;

/// Default page size for ad listings.
pub const DEFAULT_PER_PAGE: u64 = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ad {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, alias = "isBoosted")]
    pub is_boosted: bool,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Ad {
    pub fn price_display(&self) -> String {
        match self.price {
            Some(price) => format_money(price, self.currency.as_deref()),
            None => "Price on request".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdSort {
    #[default]
    Newest,
    PriceLow,
    PriceHigh,
    MostViewed,
}

impl AdSort {
    pub fn as_param(&self) -> &'static str {
        match self {
            AdSort::Newest => "newest",
            AdSort::PriceLow => "price_asc",
            AdSort::PriceHigh => "price_desc",
            AdSort::MostViewed => "views",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "newest" => Some(AdSort::Newest),
            "price_asc" | "price-low" | "cheapest" => Some(AdSort::PriceLow),
            "price_desc" | "price-high" => Some(AdSort::PriceHigh),
            "views" | "popular" => Some(AdSort::MostViewed),
            _ => None,
        }
    }
}

/// Filters for the ad listing. Empty filters are left out of the query string.
#[derive(Debug, Clone, PartialEq)]
pub struct AdQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort: AdSort,
    pub page: u64,
    pub per_page: u64,
}

impl Default for AdQuery {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            location: None,
            min_price: None,
            max_price: None,
            sort: AdSort::default(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl AdQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        let mut text = |key: &str, value: &Option<String>| {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                params.push((key.to_string(), v.to_string()));
            }
        };
        text("search", &self.search);
        text("category", &self.category);
        text("location", &self.location);
        if let Some(min) = self.min_price {
            params.push(("min_price".to_string(), min.to_string()));
        }
        if let Some(max) = self.max_price {
            params.push(("max_price".to_string(), max.to_string()));
        }
        params.push(("sort".to_string(), self.sort.as_param().to_string()));
        params.push(("page".to_string(), self.page.max(1).to_string()));
        params.push(("per_page".to_string(), self.per_page.to_string()));
        params
    }
}

/// Payload for posting a new ad.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdDraft {
    pub title: String,
    pub description: String,
    pub price: Option<f64>,
    pub category: String,
    pub location: String,
}
