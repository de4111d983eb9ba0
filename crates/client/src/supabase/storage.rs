//! Object storage endpoints.

use tracing::{debug, instrument};

use super::{SupabaseClient, SupabaseError};

/// Content types for the file extensions the app actually uploads.
///
/// Anything unrecognized falls back to `application/octet-stream`; the
/// backend stores it fine either way.
fn content_type_for(path: &str) -> &'static str {
    match path.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

impl SupabaseClient {
    /// Upload an object and return its public URL.
    ///
    /// With `upsert` set, an existing object at the same path is replaced
    /// instead of rejected - avatars rely on this (one stable path per
    /// user).
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError`] on transport failure or a non-success
    /// status.
    #[instrument(skip(self, bytes), fields(bucket, path, size = bytes.len()))]
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        upsert: bool,
    ) -> Result<String, SupabaseError> {
        let url = self.endpoint(&format!("/storage/v1/object/{bucket}/{path}"));
        let content_type = content_type_for(path);

        let response = self
            .request(reqwest::Method::POST, &url)
            .header("Content-Type", content_type)
            .header("x-upsert", if upsert { "true" } else { "false" })
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let public_url = self.public_url(bucket, path);
        debug!(%public_url, "upload ok");
        Ok(public_url)
    }

    /// The public URL for an object in a public bucket.
    #[must_use]
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        self.endpoint(&format!("/storage/v1/object/public/{bucket}/{path}"))
    }

    /// Bucket name for user avatars.
    #[must_use]
    pub fn avatar_bucket(&self) -> &str {
        &self.inner.avatar_bucket
    }

    /// Bucket name for book covers.
    #[must_use]
    pub fn cover_bucket(&self) -> &str {
        &self.inner.cover_bucket
    }

    /// Bucket name for book PDFs.
    #[must_use]
    pub fn pdf_bucket(&self) -> &str {
        &self.inner.pdf_bucket
    }
}
