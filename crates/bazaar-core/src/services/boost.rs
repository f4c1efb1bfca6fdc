use serde_json::json;
use tracing::info;

use super::Marketplace;
use crate::api::{ApiError, ApiRequest, ItemEnvelope};
use crate::cache::Fetched;
use crate::models::{BoostOrder, BoostPricing};
use crate::notify::{ActionError, InlineAlert};

impl Marketplace {
    /// Promotion plans for one ad. Prices rarely change, so a short cache
    /// window absorbs repeated opens of the boost dialog.
    pub async fn boost_pricing(&self, ad_id: i64) -> Result<Fetched<BoostPricing>, ApiError> {
        self.boost_pricing
            .get_or_fetch(&ad_id, || async move {
                let request = ApiRequest::get(format!("/ads/{}/boost/pricing", ad_id));
                let envelope: ItemEnvelope<BoostPricing> = self.callers.standard.send_json(request).await?;
                Ok(envelope.into_inner())
            })
            .await
    }

    /// Buy a plan. The plan must be one the pricing endpoint offers.
    pub async fn boost_ad(&self, ad_id: i64, plan_id: i64) -> Result<BoostOrder, ActionError> {
        let pricing = self.boost_pricing(ad_id).await?.value;
        let Some(plan) = pricing.plan(plan_id) else {
            return Err(InlineAlert::validation("plan", format!("no plan {} for this ad", plan_id)).into());
        };
        info!(ad_id, plan = %plan.name, days = plan.days, "Boosting ad");

        let request = ApiRequest::post(format!("/ads/{}/boost", ad_id)).json(&json!({ "plan_id": plan_id }))?;
        let envelope: ItemEnvelope<BoostOrder> = self.callers.standard.send_json(request).await?;
        self.ad_detail.invalidate(&ad_id);
        Ok(envelope.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::cache::FetchSource;
    use crate::testing::MarketHarness;

    fn pricing_json() -> serde_json::Value {
        json!({
            "ad_id": 7,
            "currency": "GHS",
            "plans": [
                { "id": 1, "name": "Week", "days": 7, "price": 15.0 },
                { "id": 2, "name": "Month", "days": 30, "price": 45.0 }
            ]
        })
    }

    #[tokio::test]
    async fn test_pricing_window_is_two_minutes() {
        let h = MarketHarness::new();
        h.transport.push_json(pricing_json());
        h.transport.push_json(pricing_json());

        h.market.boost_pricing(7).await.expect("first");
        h.clock.advance_secs(119);
        let second = h.market.boost_pricing(7).await.expect("second");
        assert_eq!(second.source, FetchSource::Cache);
        assert_eq!(h.transport.calls(), 1);

        h.clock.advance_secs(2);
        let third = h.market.boost_pricing(7).await.expect("third");
        assert_eq!(third.source, FetchSource::Network);
        assert_eq!(h.transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_pricing_is_cached_per_ad() {
        let h = MarketHarness::new();
        h.transport.push_json(pricing_json());
        h.transport.push_json(pricing_json());

        h.market.boost_pricing(7).await.expect("ad 7");
        h.market.boost_pricing(8).await.expect("ad 8");
        assert_eq!(
            h.paths(),
            vec!["/ads/7/boost/pricing".to_string(), "/ads/8/boost/pricing".to_string()]
        );
    }

    #[tokio::test]
    async fn test_boost_posts_chosen_plan() {
        let h = MarketHarness::new();
        h.transport.push_json(pricing_json());
        h.transport.push_json(json!({ "ad_id": 7, "plan_id": 2, "expires_at": "2025-01-31" }));

        let order = h.market.boost_ad(7, 2).await.expect("order");
        assert_eq!(order.plan_id, 2);

        let request = &h.transport.requests()[1];
        assert_eq!(request.path, "/ads/7/boost");
        assert_eq!(request.body, crate::api::RequestBody::Json(json!({ "plan_id": 2 })));
    }

    #[tokio::test]
    async fn test_unknown_plan_is_rejected_locally() {
        let h = MarketHarness::new();
        h.transport.push_json(pricing_json());

        let err = h.market.boost_ad(7, 99).await.unwrap_err();
        assert!(err.alert().is_some());
        assert_eq!(h.transport.calls(), 1);
    }
}
