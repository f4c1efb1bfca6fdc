//! The multi-step "sell a book" wizard.
//!
//! Steps run `Details -> Pricing -> File -> Review`. `advance` refuses to
//! leave a step whose fields are invalid and reports why as an inline alert.
//! Only a wizard that has reached `Review` can be submitted.

use std::path::Path;

use reqwest::Method;
use tracing::info;

use crate::api::{ApiRequest, Caller, FormPart, RequestBody};
use crate::models::Book;
use crate::notify::{ActionError, InlineAlert};

/// Largest accepted book file (50 MiB).
pub const MAX_BOOK_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadStep {
    #[default]
    Details,
    Pricing,
    File,
    Review,
}

impl UploadStep {
    pub const ALL: [UploadStep; 4] = [
        UploadStep::Details,
        UploadStep::Pricing,
        UploadStep::File,
        UploadStep::Review,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            UploadStep::Details => "Details",
            UploadStep::Pricing => "Pricing",
            UploadStep::File => "File",
            UploadStep::Review => "Review",
        }
    }

    fn next(self) -> Self {
        match self {
            UploadStep::Details => UploadStep::Pricing,
            UploadStep::Pricing => UploadStep::File,
            UploadStep::File | UploadStep::Review => UploadStep::Review,
        }
    }

    fn previous(self) -> Self {
        match self {
            UploadStep::Details | UploadStep::Pricing => UploadStep::Details,
            UploadStep::File => UploadStep::Pricing,
            UploadStep::Review => UploadStep::File,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl BookFile {
    fn mime(&self) -> Option<&'static str> {
        let ext = Path::new(&self.filename).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some("application/pdf"),
            "epub" => Some("application/epub+zip"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookUpload {
    step: UploadStep,
    pub title: String,
    pub author: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    file: Option<BookFile>,
}

impl BookUpload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> UploadStep {
        self.step
    }

    pub fn file(&self) -> Option<&BookFile> {
        self.file.as_ref()
    }

    pub fn attach(&mut self, filename: impl Into<String>, bytes: Vec<u8>) {
        self.file = Some(BookFile {
            filename: filename.into(),
            bytes,
        });
    }

    /// Validate the current step and move to the next one.
    pub fn advance(&mut self) -> Result<UploadStep, InlineAlert> {
        self.check(self.step)?;
        self.step = self.step.next();
        Ok(self.step)
    }

    pub fn back(&mut self) -> UploadStep {
        self.step = self.step.previous();
        self.step
    }

    pub fn check(&self, step: UploadStep) -> Result<(), InlineAlert> {
        match step {
            UploadStep::Details => {
                if self.title.trim().is_empty() {
                    return Err(InlineAlert::validation("title", "is required"));
                }
                if self.author.trim().is_empty() {
                    return Err(InlineAlert::validation("author", "is required"));
                }
                Ok(())
            }
            UploadStep::Pricing => {
                if !self.price.is_finite() || self.price < 0.0 {
                    return Err(InlineAlert::validation("price", "must be zero or more"));
                }
                Ok(())
            }
            UploadStep::File => {
                let Some(file) = &self.file else {
                    return Err(InlineAlert::validation("file", "choose a PDF or EPUB file"));
                };
                if file.mime().is_none() {
                    return Err(InlineAlert::validation("file", "only .pdf and .epub files are accepted"));
                }
                if file.bytes.is_empty() {
                    return Err(InlineAlert::validation("file", "is empty"));
                }
                if file.bytes.len() > MAX_BOOK_BYTES {
                    return Err(InlineAlert::validation("file", "must be smaller than 50 MiB"));
                }
                Ok(())
            }
            UploadStep::Review => Ok(()),
        }
    }

    fn into_parts(self) -> Result<Vec<FormPart>, InlineAlert> {
        for step in UploadStep::ALL {
            self.check(step)?;
        }
        let Some(file) = self.file else {
            return Err(InlineAlert::validation("file", "choose a PDF or EPUB file"));
        };
        let mime = file.mime().unwrap_or("application/octet-stream").to_string();

        Ok(vec![
            FormPart::text("title", self.title.trim()),
            FormPart::text("author", self.author.trim()),
            FormPart::text("description", self.description.trim()),
            FormPart::text("category", self.category.trim()),
            FormPart::text("price", format!("{:.2}", self.price)),
            FormPart::File {
                name: "file".to_string(),
                filename: file.filename,
                mime,
                bytes: file.bytes,
            },
        ])
    }

    /// Send the finished wizard as one multipart request. `caller` should be
    /// built for the upload variant.
    pub async fn submit(self, caller: &Caller) -> Result<Book, ActionError> {
        if self.step != UploadStep::Review {
            return Err(InlineAlert::validation(self.step.title(), "complete this step before submitting").into());
        }
        let title = self.title.clone();
        let parts = self.into_parts()?;
        let request = ApiRequest::new(Method::POST, "/books").body(RequestBody::Multipart(parts));

        let book: Book = caller.send_json(request).await?;
        info!(id = book.id, title = %title, "Book uploaded");
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::NotifyPolicy;
    use crate::testing::scripted_caller;

    fn filled() -> BookUpload {
        let mut upload = BookUpload::new();
        upload.title = "Rust in Accra".to_string();
        upload.author = "K. Mensah".to_string();
        upload.price = 25.0;
        upload.attach("rust.PDF", b"%PDF-1.7".to_vec());
        upload
    }

    fn walk_to_review(upload: &mut BookUpload) {
        for _ in 0..3 {
            upload.advance().expect("valid step");
        }
    }

    #[test]
    fn test_steps_advance_in_order() {
        let mut upload = filled();
        assert_eq!(upload.step(), UploadStep::Details);
        assert_eq!(upload.advance(), Ok(UploadStep::Pricing));
        assert_eq!(upload.advance(), Ok(UploadStep::File));
        assert_eq!(upload.advance(), Ok(UploadStep::Review));
        assert_eq!(upload.back(), UploadStep::File);
    }

    #[test]
    fn test_missing_author_blocks_details() {
        let mut upload = filled();
        upload.author = "  ".to_string();

        let alert = upload.advance().unwrap_err();
        assert_eq!(alert, InlineAlert::validation("author", "is required"));
        assert_eq!(upload.step(), UploadStep::Details);
    }

    #[test]
    fn test_negative_price_is_rejected_but_free_is_fine() {
        let mut upload = filled();
        upload.advance().expect("details");

        upload.price = -1.0;
        assert!(upload.advance().is_err());

        upload.price = 0.0;
        assert_eq!(upload.advance(), Ok(UploadStep::File));
    }

    #[test]
    fn test_file_type_and_size_checks() {
        let mut upload = filled();
        upload.attach("notes.docx", b"data".to_vec());
        assert!(upload.check(UploadStep::File).is_err());

        upload.attach("book.epub", vec![0u8; MAX_BOOK_BYTES + 1]);
        assert_eq!(
            upload.check(UploadStep::File),
            Err(InlineAlert::validation("file", "must be smaller than 50 MiB"))
        );

        upload.attach("book.epub", b"PK".to_vec());
        assert_eq!(upload.check(UploadStep::File), Ok(()));
    }

    #[tokio::test]
    async fn test_submit_before_review_sends_nothing() {
        let (caller, transport, _) = scripted_caller(NotifyPolicy::Always);
        let err = filled().submit(&caller).await.unwrap_err();

        assert!(err.alert().is_some());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_submit_sends_multipart_form() {
        let (caller, transport, _) = scripted_caller(NotifyPolicy::Always);
        transport.push_json(json!({ "id": 5, "title": "Rust in Accra", "author": "K. Mensah", "price": 25.0 }));

        let mut upload = filled();
        walk_to_review(&mut upload);
        let book = upload.submit(&caller).await.expect("uploaded");
        assert_eq!(book.id, 5);

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/books");
        let RequestBody::Multipart(parts) = &request.body else {
            panic!("expected multipart body, got {:?}", request.body);
        };
        let names: Vec<&str> = parts.iter().map(FormPart::name).collect();
        assert_eq!(names, vec!["title", "author", "description", "category", "price", "file"]);
        assert!(parts.contains(&FormPart::File {
            name: "file".to_string(),
            filename: "rust.PDF".to_string(),
            mime: "application/pdf".to_string(),
            bytes: b"%PDF-1.7".to_vec(),
        }));
    }

    #[tokio::test]
    async fn test_server_rejection_is_an_api_error() {
        let (caller, transport, notifier) = scripted_caller(NotifyPolicy::Always);
        transport.push_error(422, r#"{"message": "Title already taken"}"#);

        let mut upload = filled();
        walk_to_review(&mut upload);
        let err = upload.submit(&caller).await.unwrap_err();

        assert_eq!(err.api().and_then(|e| e.status()), Some(422));
        assert_eq!(notifier.messages(), vec!["Title already taken".to_string()]);
    }
}
