use std::path::Path;

use tracing::info;

use super::Marketplace;
use crate::api::{ApiError, ApiRequest, ListEnvelope};
use crate::cache::Fetched;
use crate::models::Book;
use crate::notify::{ActionError, InlineAlert};
use crate::upload::BookUpload;

/// Download refused because the book has not been bought.
const PURCHASE_REQUIRED_STATUS: u16 = 403;

impl Marketplace {
    pub async fn books(&self) -> Result<Fetched<Vec<Book>>, ApiError> {
        self.book_list
            .get_or_fetch(&(), || async {
                let envelope: ListEnvelope<Book> = self.callers.standard.send_json(ApiRequest::get("/books")).await?;
                Ok(envelope.into_page(0).items)
            })
            .await
    }

    /// Save a purchased book to `dest`. Nothing is written unless the whole
    /// file arrived. A 403 comes back as the inline purchase-required alert.
    pub async fn download_book(&self, id: i64, dest: &Path) -> Result<u64, ActionError> {
        let request = ApiRequest::get(format!("/books/{}/download", id)).handles_status(PURCHASE_REQUIRED_STATUS);
        let bytes = match self.callers.standard.send_bytes(request).await {
            Ok(bytes) => bytes,
            Err(e) if e.status() == Some(PURCHASE_REQUIRED_STATUS) => {
                return Err(InlineAlert::PurchaseRequired.into());
            }
            Err(e) => return Err(e.into()),
        };

        std::fs::write(dest, &bytes)?;
        info!(id, path = %dest.display(), bytes = bytes.len(), "Book saved");
        Ok(bytes.len() as u64)
    }

    pub async fn upload_book(&self, upload: BookUpload) -> Result<Book, ActionError> {
        let book = upload.submit(&self.callers.upload).await?;
        self.book_list.invalidate(&());
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::cache::FetchSource;
    use crate::notify::InlineAlert;
    use crate::testing::MarketHarness;

    const PURCHASE_FIRST: &str = "You need to purchase this item first.";

    #[tokio::test]
    async fn test_book_list_cached_for_five_minutes() {
        let h = MarketHarness::new();
        h.transport.push_json(json!({ "data": [{ "id": 1, "title": "Ananse", "author": "Anon", "price": 0.0 }] }));
        h.transport.push_json(json!([]));

        h.market.books().await.expect("books");
        h.clock.advance_secs(299);
        assert_eq!(h.market.books().await.expect("books").source, FetchSource::Cache);

        h.clock.advance_secs(1);
        let refreshed = h.market.books().await.expect("books");
        assert_eq!(refreshed.source, FetchSource::Network);
        assert!(refreshed.value.is_empty());
    }

    #[tokio::test]
    async fn test_unpurchased_download_writes_nothing() {
        let h = MarketHarness::new();
        h.transport.push_error(403, r#"{"message": "Forbidden"}"#);
        let dir = tempfile::tempdir().expect("tempdir");
        let dest = dir.path().join("book.pdf");

        let err = h.market.download_book(3, &dest).await.unwrap_err();

        assert_eq!(err.alert(), Some(&InlineAlert::PurchaseRequired));
        assert_eq!(err.to_string(), PURCHASE_FIRST);
        assert!(h.notifier.messages().is_empty());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_other_download_failures_still_notify() {
        let h = MarketHarness::new();
        h.transport.push_error(500, r#"{"message": "Server error"}"#);
        let dir = tempfile::tempdir().expect("tempdir");
        let dest = dir.path().join("book.pdf");

        let err = h.market.download_book(3, &dest).await.unwrap_err();

        assert_eq!(err.api().and_then(|e| e.status()), Some(500));
        assert_eq!(h.notifier.messages(), vec!["Server error".to_string()]);
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_download_saves_bytes() {
        let h = MarketHarness::new();
        h.transport.push_bytes(b"%PDF-1.7 body");
        let dir = tempfile::tempdir().expect("tempdir");
        let dest = dir.path().join("book.pdf");

        let written = h.market.download_book(3, &dest).await.expect("saved");

        assert_eq!(written, 13);
        assert_eq!(std::fs::read(&dest).expect("read"), b"%PDF-1.7 body");
        assert_eq!(h.paths(), vec!["/books/3/download".to_string()]);
    }
}
