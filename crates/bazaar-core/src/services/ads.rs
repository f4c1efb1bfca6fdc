use tracing::info;

use super::Marketplace;
use crate::api::{ApiError, ApiRequest, ItemEnvelope, ListEnvelope, ListPage};
use crate::cache::Fetched;
use crate::models::{Ad, AdDraft, AdQuery};
use crate::notify::{ActionError, InlineAlert};

impl Marketplace {
    /// The ad listing. Goes through the slow client, so a throttled request
    /// raises no toast: it falls back to any cached page, or comes back as
    /// `ApiError::RateLimited` for the view to show its own banner.
    pub async fn search_ads(&self, query: &AdQuery) -> Result<Fetched<ListPage<Ad>>, ApiError> {
        self.ad_list
            .get_or_fetch(query, || async {
                let request = ApiRequest::get("/ads").query(query.to_params());
                let envelope: ListEnvelope<Ad> = self.callers.slow.send_json(request).await?;
                Ok(envelope.into_page(query.per_page))
            })
            .await
    }

    pub async fn ad(&self, id: i64) -> Result<Fetched<Ad>, ApiError> {
        self.ad_detail
            .get_or_fetch(&id, || async move {
                let request = ApiRequest::get(format!("/ads/{}", id));
                let envelope: ItemEnvelope<Ad> = self.callers.standard.send_json(request).await?;
                Ok(envelope.into_inner())
            })
            .await
    }

    /// Title completions for the search box. Failures are logged only.
    pub async fn suggestions(&self, query: &str) -> Result<Vec<String>, ApiError> {
        let request = ApiRequest::get("/ads/suggestions").query(vec![("q".to_string(), query.to_string())]);
        let envelope: ListEnvelope<String> = self.callers.background.send_json(request).await?;
        Ok(envelope.into_page(0).items)
    }

    pub async fn create_ad(&self, draft: &AdDraft) -> Result<Ad, ActionError> {
        if draft.title.trim().is_empty() {
            return Err(InlineAlert::validation("title", "is required").into());
        }
        if draft.price.is_some_and(|p| !p.is_finite() || p < 0.0) {
            return Err(InlineAlert::validation("price", "must be zero or more").into());
        }
        let request = ApiRequest::post("/ads").json(draft)?;
        let envelope: ItemEnvelope<Ad> = self.callers.standard.send_json(request).await?;
        let ad = envelope.into_inner();
        info!(id = ad.id, "Ad posted");
        Ok(ad)
    }

    pub async fn delete_ad(&self, id: i64) -> Result<(), ApiError> {
        self.callers
            .standard
            .send(ApiRequest::delete(format!("/ads/{}", id)))
            .await?;
        self.ad_detail.invalidate(&id);
        info!(id, "Ad deleted");
        Ok(())
    }
}
