use serde_json::json;

use super::Marketplace;
use crate::api::{ApiError, ApiRequest, ItemEnvelope, ListEnvelope};
use crate::models::{Conversation, Message};
use crate::notify::{ActionError, InlineAlert};

/// Longest message body the backend stores.
pub const MAX_MESSAGE_CHARS: usize = 2000;

impl Marketplace {
    pub async fn conversations(&self) -> Result<Vec<Conversation>, ApiError> {
        let envelope: ListEnvelope<Conversation> = self.callers.standard.send_json(ApiRequest::get("/conversations")).await?;
        Ok(envelope.into_page(0).items)
    }

    pub async fn messages(&self, conversation_id: i64) -> Result<Vec<Message>, ApiError> {
        let request = ApiRequest::get(format!("/conversations/{}/messages", conversation_id));
        let envelope: ListEnvelope<Message> = self.callers.standard.send_json(request).await?;
        Ok(envelope.into_page(0).items)
    }

    pub async fn send_message(&self, conversation_id: i64, body: &str) -> Result<Message, ActionError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(InlineAlert::validation("message", "cannot be empty").into());
        }
        if body.chars().count() > MAX_MESSAGE_CHARS {
            return Err(InlineAlert::validation("message", format!("is limited to {} characters", MAX_MESSAGE_CHARS)).into());
        }
        let request =
            ApiRequest::post(format!("/conversations/{}/messages", conversation_id)).json(&json!({ "body": body }))?;
        let envelope: ItemEnvelope<Message> = self.callers.standard.send_json(request).await?;
        Ok(envelope.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::testing::MarketHarness;

    #[tokio::test]
    async fn test_conversations_accept_bare_array() {
        let h = MarketHarness::new();
        h.transport.push_json(json!([
            { "id": 1, "other_party": "Ama", "unread": 2 },
            { "id": 2, "other_party": "Kofi" }
        ]));

        let conversations = h.market.conversations().await.expect("conversations");
        assert_eq!(conversations.len(), 2);
        assert_eq!(conversations[0].unread, 2);
    }

    #[tokio::test]
    async fn test_send_message_trims_and_posts() {
        let h = MarketHarness::new();
        h.transport.push_json(json!({ "id": 10, "conversation_id": 3, "sender_id": 1, "body": "Still available?" }));

        let message = h.market.send_message(3, "  Still available?  ").await.expect("sent");
        assert_eq!(message.id, 10);

        let request = &h.transport.requests()[0];
        assert_eq!(request.path, "/conversations/3/messages");
        assert_eq!(request.body, crate::api::RequestBody::Json(json!({ "body": "Still available?" })));
    }

    #[tokio::test]
    async fn test_blank_message_is_not_sent() {
        let h = MarketHarness::new();
        let err = h.market.send_message(3, "   ").await.unwrap_err();

        assert!(err.alert().is_some());
        assert_eq!(h.transport.calls(), 0);
    }
}
