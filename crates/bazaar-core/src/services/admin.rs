use tracing::info;

use super::Marketplace;
use crate::api::{ApiError, ApiRequest, ItemEnvelope, ListEnvelope};
use crate::models::{NewsDraft, NewsItem, NewsletterDraft, NewsletterReceipt, Subscriber};
use crate::notify::{ActionError, InlineAlert};

fn require(field: &str, value: &str) -> Result<(), InlineAlert> {
    if value.trim().is_empty() {
        Err(InlineAlert::validation(field, "is required"))
    } else {
        Ok(())
    }
}

impl Marketplace {
    /// Public news feed.
    pub async fn news(&self) -> Result<Vec<NewsItem>, ApiError> {
        let envelope: ListEnvelope<NewsItem> = self.callers.standard.send_json(ApiRequest::get("/news")).await?;
        Ok(envelope.into_page(0).items)
    }

    pub async fn publish_news(&self, draft: &NewsDraft) -> Result<NewsItem, ActionError> {
        require("title", &draft.title)?;
        require("body", &draft.body)?;
        let request = ApiRequest::post("/admin/news").json(draft)?;
        let envelope: ItemEnvelope<NewsItem> = self.callers.standard.send_json(request).await?;
        let item = envelope.into_inner();
        info!(id = item.id, "News published");
        Ok(item)
    }

    pub async fn delete_news(&self, id: i64) -> Result<(), ApiError> {
        self.callers
            .standard
            .send(ApiRequest::delete(format!("/admin/news/{}", id)))
            .await?;
        Ok(())
    }

    /// Mailing a large list can take a while; uses the slow client.
    pub async fn send_newsletter(&self, draft: &NewsletterDraft) -> Result<NewsletterReceipt, ActionError> {
        require("subject", &draft.subject)?;
        require("body", &draft.body)?;
        let request = ApiRequest::post("/admin/newsletter").json(draft)?;
        let receipt: NewsletterReceipt = self.callers.slow.send_json(request).await?;
        info!(sent = receipt.sent, "Newsletter sent");
        Ok(receipt)
    }

    pub async fn newsletter_subscribers(&self) -> Result<Vec<Subscriber>, ApiError> {
        let envelope: ListEnvelope<Subscriber> = self
            .callers
            .standard
            .send_json(ApiRequest::get("/admin/newsletter/subscribers"))
            .await?;
        Ok(envelope.into_page(0).items)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::models::{NewsDraft, NewsletterDraft};
    use crate::testing::MarketHarness;

    #[tokio::test]
    async fn test_publish_requires_title() {
        let h = MarketHarness::new();
        let draft = NewsDraft {
            title: String::new(),
            body: "Body".to_string(),
        };

        let err = h.market.publish_news(&draft).await.unwrap_err();
        assert_eq!(err.to_string(), "title: is required");
        assert_eq!(h.transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_newsletter_reports_recipients() {
        let h = MarketHarness::new();
        h.transport.push_json(json!({ "recipients": 250 }));
        let draft = NewsletterDraft {
            subject: "March deals".to_string(),
            body: "Hello".to_string(),
        };

        let receipt = h.market.send_newsletter(&draft).await.expect("sent");
        assert_eq!(receipt.sent, 250);
        assert_eq!(h.paths(), vec!["/admin/newsletter".to_string()]);
    }

    #[tokio::test]
    async fn test_forbidden_admin_call_notifies() {
        let h = MarketHarness::new();
        h.transport.push_error(403, r#"{"message": "Admins only"}"#);

        assert!(h.market.newsletter_subscribers().await.is_err());
        assert_eq!(h.notifier.messages(), vec!["Admins only".to_string()]);
    }
}
