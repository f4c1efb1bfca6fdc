use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostPlan {
    pub id: i64,
    pub name: String,
    pub days: u32,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostPricing {
    pub ad_id: i64,
    #[serde(default)]
    pub plans: Vec<BoostPlan>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl BoostPricing {
    pub fn plan(&self, plan_id: i64) -> Option<&BoostPlan> {
        self.plans.iter().find(|p| p.id == plan_id)
    }

    pub fn cheapest(&self) -> Option<&BoostPlan> {
        self.plans
            .iter()
            .min_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(std::cmp::Ordering::Equal))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoostOrder {
    pub ad_id: i64,
    pub plan_id: i64,
    #[serde(default)]
    pub expires_at: Option<String>,
}
