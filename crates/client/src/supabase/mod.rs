//! Supabase gateway: GoTrue auth, PostgREST tables, and object storage.
//!
//! # Architecture
//!
//! - Plain REST over `reqwest` - one shared HTTP client behind an `Arc`
//! - Supabase is the source of truth - no local persistence, no caching
//! - Raw response rows live in [`rows`]; normalization into domain types
//!   happens next to the models, never in the calling code
//!
//! # Example
//!
//! ```rust,ignore
//! use livraria_client::{Config, SupabaseClient};
//!
//! let client = SupabaseClient::new(&Config::from_env()?);
//!
//! // Sign in (stores the access token for subsequent table reads)
//! let session = client.sign_in(&email, "hunter2!").await?;
//!
//! // Query a table
//! let books: Vec<BookRow> = client
//!     .from("livros")
//!     .select("*")
//!     .ilike("genero", "%ficção%")
//!     .fetch()
//!     .await?;
//! ```

pub mod auth;
pub mod postgrest;
pub mod rows;
pub mod storage;

pub use auth::{AuthError, AuthSession};
pub use postgrest::{QueryBuilder, Returning};

use std::sync::{Arc, RwLock};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::Config;

/// Errors that can occur when talking to Supabase.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed (network, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status with a message.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the response body, when one could be parsed.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// Error body shape PostgREST and Storage return on failure.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(alias = "msg", alias = "error_description", alias = "error")]
    message: Option<String>,
}

/// Client for a Supabase project.
///
/// Cheaply cloneable; all clones share the HTTP connection pool and the
/// current access token. After [`sign_in`](Self::sign_in) succeeds the
/// user's bearer token is attached to every request (row-level security
/// scopes reads and writes to that user); before that, the anon key is
/// used.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    http: reqwest::Client,
    base_url: Url,
    anon_key: SecretString,
    access_token: RwLock<Option<SecretString>>,
    pub(crate) avatar_bucket: String,
    pub(crate) cover_bucket: String,
    pub(crate) pdf_bucket: String,
}

impl SupabaseClient {
    /// Create a new client from configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            inner: Arc::new(SupabaseClientInner {
                http: reqwest::Client::new(),
                base_url: config.supabase_url.clone(),
                anon_key: config.supabase_anon_key.clone(),
                access_token: RwLock::new(None),
                avatar_bucket: config.avatar_bucket.clone(),
                cover_bucket: config.cover_bucket.clone(),
                pdf_bucket: config.pdf_bucket.clone(),
            }),
        }
    }

    /// Build an absolute URL under the project base.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        format!("{base}/{}", path.trim_start_matches('/'))
    }

    /// A request builder with the `apikey` and `Authorization` headers set.
    ///
    /// Uses the signed-in user's token when present, the anon key otherwise.
    pub(crate) fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let anon = self.inner.anon_key.expose_secret().to_owned();
        let bearer = self
            .inner
            .access_token
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|t| t.expose_secret().to_owned()))
            .unwrap_or_else(|| anon.clone());

        self.inner
            .http
            .request(method, url)
            .header("apikey", anon)
            .bearer_auth(bearer)
    }

    /// Replace the stored access token (set on sign-in, cleared on sign-out).
    pub(crate) fn set_access_token(&self, token: Option<SecretString>) {
        if let Ok(mut guard) = self.inner.access_token.write() {
            *guard = token;
        }
    }

    /// Whether a user token is currently attached.
    #[must_use]
    pub fn has_access_token(&self) -> bool {
        self.inner
            .access_token
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Triage a non-success response into a [`SupabaseError`].
    ///
    /// Reads the body as text first so failures stay diagnosable even when
    /// the error payload is not the documented JSON shape.
    pub(crate) async fn error_from_response(response: reqwest::Response) -> SupabaseError {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return SupabaseError::RateLimited(retry_after);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| body.chars().take(200).collect());

        tracing::error!(status = %status, message = %message, "Supabase API error");

        SupabaseError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_client() -> SupabaseClient {
        let config = Config {
            supabase_url: Url::parse("https://xyz.supabase.co").unwrap(),
            supabase_anon_key: SecretString::from("eyJ-test-key-eyJ-test-key"),
            avatar_bucket: "avatars".to_string(),
            cover_bucket: "capas".to_string(),
            pdf_bucket: "pdfs".to_string(),
        };
        SupabaseClient::new(&config)
    }

    #[test]
    fn test_endpoint_joins_cleanly() {
        let client = test_client();
        assert_eq!(
            client.endpoint("/rest/v1/livros"),
            "https://xyz.supabase.co/rest/v1/livros"
        );
        assert_eq!(
            client.endpoint("auth/v1/token"),
            "https://xyz.supabase.co/auth/v1/token"
        );
    }

    #[test]
    fn test_access_token_lifecycle() {
        let client = test_client();
        assert!(!client.has_access_token());
        client.set_access_token(Some(SecretString::from("user-token")));
        assert!(client.has_access_token());
        client.set_access_token(None);
        assert!(!client.has_access_token());
    }
}
