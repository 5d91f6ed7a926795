//! REST client for the listing endpoints.
//!
//! Wraps `GET <detail_url>` and the multipart `POST <update_url>` using
//! [`reqwest`]. URLs handed out by the backend are usually relative; they
//! are resolved against the configured base URL.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Url;

use fleetdesk_core::listing::{ListingEnvelope, ListingPayload, UpdateResponse};
use fleetdesk_core::listing_editor::UpdateForm;

use crate::error::ClientError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for one listing backend.
#[derive(Debug, Clone)]
pub struct ListingApi {
    client: reqwest::Client,
    base_url: Url,
}

impl ListingApi {
    /// Create a client with the [`DEFAULT_TIMEOUT`].
    ///
    /// * `base_url` - Backend origin, e.g. `http://localhost:5000`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful when the host already holds a session cookie jar).
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a possibly relative URL against the base URL.
    pub fn resolve(&self, url: &str) -> Result<Url, ClientError> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(ClientError::InvalidUrl {
                url: url.to_string(),
                reason: "empty URL".into(),
            });
        }
        self.base_url
            .join(trimmed)
            .map_err(|e| ClientError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Fetch a listing.
    ///
    /// Sends `GET <detail_url>` and unwraps the `{"car": ...}` envelope.
    pub async fn fetch_listing(&self, detail_url: &str) -> Result<ListingPayload, ClientError> {
        let url = self.resolve(detail_url)?;
        tracing::debug!(%url, "Fetching listing");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let envelope: ListingEnvelope = Self::parse_response(response).await?;
        Ok(envelope.car)
    }

    /// Submit a listing update.
    ///
    /// Sends `POST <update_url>` as `multipart/form-data`: every text pair
    /// of the form (including one `delete_images` entry per id) followed by
    /// one file part per new photo.
    pub async fn submit_update(&self, form: &UpdateForm) -> Result<UpdateResponse, ClientError> {
        let url = self.resolve(&form.update_url)?;
        let body = Self::build_multipart(form).await?;
        tracing::debug!(
            %url,
            listing_id = form.listing_id,
            deletions = form.delete_images.len(),
            new_photos = form.new_photos.len(),
            "Submitting listing update",
        );

        let response = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    async fn build_multipart(form: &UpdateForm) -> Result<Form, ClientError> {
        let mut body = Form::new();
        for (name, value) in form.text_pairs() {
            body = body.text(name, value);
        }
        for photo in &form.new_photos {
            let bytes = tokio::fs::read(&photo.path)
                .await
                .map_err(|source| ClientError::Upload {
                    path: photo.path.clone(),
                    source,
                })?;
            let part = Part::bytes(bytes)
                .file_name(photo.file_name.clone())
                .mime_str(image_mime(photo.extension().as_deref()))?;
            body = body.part(form.photo_field.clone(), part);
        }
        Ok(body)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`ClientError::Api`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

fn image_mime(extension: Option<&str>) -> &'static str {
    match extension {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use fleetdesk_core::dynamic_list::FileSelection;
    use std::io::Write;

    fn form_with_photo(path: std::path::PathBuf) -> UpdateForm {
        UpdateForm {
            listing_id: 7,
            update_url: "/owner/cars/7/update".into(),
            fields: vec![("name".into(), "Swift".into())],
            delete_images: vec![3],
            photo_field: "new_photos".into(),
            new_photos: vec![FileSelection::new(path)],
        }
    }

    #[test]
    fn relative_urls_resolve_against_base() {
        let api = ListingApi::new("http://localhost:5000").unwrap();
        assert_eq!(
            api.resolve("/owner/cars/7/data").unwrap().as_str(),
            "http://localhost:5000/owner/cars/7/data"
        );
        assert_eq!(
            api.resolve("https://fleet.example/owner/cars/7/data")
                .unwrap()
                .as_str(),
            "https://fleet.example/owner/cars/7/data"
        );
    }

    #[test]
    fn empty_and_invalid_urls_are_rejected() {
        let api = ListingApi::new("http://localhost:5000").unwrap();
        assert_matches!(api.resolve("  "), Err(ClientError::InvalidUrl { .. }));
        assert_matches!(
            ListingApi::new("not a url"),
            Err(ClientError::InvalidUrl { .. })
        );
    }

    #[test]
    fn mime_by_extension() {
        assert_eq!(image_mime(Some("jpeg")), "image/jpeg");
        assert_eq!(image_mime(Some("webp")), "image/webp");
        assert_eq!(image_mime(None), "application/octet-stream");
    }

    #[tokio::test]
    async fn multipart_reads_selected_photos() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"\x89PNG\r\n").unwrap();

        let form = form_with_photo(file.path().to_path_buf());
        assert!(ListingApi::build_multipart(&form).await.is_ok());
    }

    #[tokio::test]
    async fn multipart_fails_on_missing_photo() {
        let dir = tempfile::tempdir().unwrap();
        let form = form_with_photo(dir.path().join("gone.jpg"));

        let err = ListingApi::build_multipart(&form).await.unwrap_err();
        assert_matches!(err, ClientError::Upload { ref path, .. } if path.ends_with("gone.jpg"));
        assert!(err.to_string().contains("gone.jpg"));
    }
}
