//! Configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SUPABASE_URL` - Project base URL (e.g. `https://xyz.supabase.co`)
//! - `SUPABASE_ANON_KEY` - Public anon API key
//!
//! ## Optional
//! - `LIVRARIA_AVATAR_BUCKET` - Storage bucket for avatars (default: `avatars`)
//! - `LIVRARIA_COVER_BUCKET` - Storage bucket for book covers (default: `capas`)
//! - `LIVRARIA_PDF_BUCKET` - Storage bucket for book PDFs (default: `pdfs`)

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Supabase project base URL
    pub supabase_url: Url,
    /// Public anon API key
    pub supabase_anon_key: SecretString,
    /// Storage bucket for user avatars
    pub avatar_bucket: String,
    /// Storage bucket for book covers
    pub cover_bucket: String,
    /// Storage bucket for book PDFs
    pub pdf_bucket: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing, the URL
    /// does not parse, or the anon key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url = require_env("SUPABASE_URL")?;
        let supabase_url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SUPABASE_URL".into(), e.to_string()))?;

        let anon_key = require_env("SUPABASE_ANON_KEY")?;
        validate_secret("SUPABASE_ANON_KEY", &anon_key)?;

        Ok(Self {
            supabase_url,
            supabase_anon_key: SecretString::from(anon_key),
            avatar_bucket: optional_env("LIVRARIA_AVATAR_BUCKET", "avatars"),
            cover_bucket: optional_env("LIVRARIA_COVER_BUCKET", "capas"),
            pdf_bucket: optional_env("LIVRARIA_PDF_BUCKET", "pdfs"),
        })
    }

    /// The anon key as a plain string, for request headers.
    #[must_use]
    pub fn anon_key(&self) -> &str {
        self.supabase_anon_key.expose_secret()
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Reject obviously-fake secrets before they reach a request header.
fn validate_secret(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.len() < 20 {
        return Err(ConfigError::InsecureSecret(
            name.to_string(),
            "too short to be a real key".to_string(),
        ));
    }

    let lowered = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lowered.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                name.to_string(),
                format!("contains placeholder pattern '{pattern}'"),
            ));
        }
    }

    Ok(())
}
