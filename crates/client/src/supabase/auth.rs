//! GoTrue authentication endpoints.

use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use livraria_core::{Email, EmailError, UserId};

use super::{SupabaseClient, SupabaseError};

/// Errors that can occur during authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The email failed local validation and was never sent anywhere.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The backend rejected the credentials. The message is the backend's
    /// own and is shown to the user verbatim.
    #[error("{0}")]
    Rejected(String),

    /// The request itself failed (network, parse, rate limit).
    #[error("auth request failed: {0}")]
    Gateway(#[from] SupabaseError),
}

/// The authenticated identity returned by GoTrue.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The auth user's UUID.
    pub user_id: UserId,
    /// Email the account was created with, when the backend returns one.
    pub email: Option<String>,
    /// Display name from the sign-up metadata, when present.
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    user: Option<AuthUserBody>,
}

#[derive(Debug, Deserialize)]
struct AuthUserBody {
    id: String,
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    #[serde(alias = "msg", alias = "error_description")]
    message: Option<String>,
}

impl SupabaseClient {
    /// Sign in with email and password.
    ///
    /// On success the user's access token is stored on the client, so
    /// subsequent table and storage requests run as that user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] with the backend's message when the
    /// credentials are turned down, and [`AuthError::Gateway`] when the
    /// request itself fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthSession, AuthError> {
        let url = self.endpoint("/auth/v1/token?grant_type=password");
        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&json!({ "email": email.as_str(), "password": password }))
            .send()
            .await
            .map_err(SupabaseError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AuthErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| "E-mail ou senha inválidos.".to_string());
            warn!(status = %status, "sign-in rejected");
            return Err(AuthError::Rejected(message));
        }

        let token: TokenResponse = response.json().await.map_err(SupabaseError::Http)?;
        let access_token = token.access_token.clone();
        let session = session_from_token(token)?;

        if let Some(access) = access_token {
            self.set_access_token(Some(SecretString::from(access)));
        }

        debug!(user_id = %session.user_id, "sign-in ok");
        Ok(session)
    }

    /// Create an account with email, password, and a display name stored in
    /// the user metadata.
    ///
    /// Projects with email confirmation enabled return no session here; the
    /// caller falls back to [`sign_in`](Self::sign_in) in that case, which
    /// is signalled by `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] with the backend message (e.g. email
    /// already registered) or [`AuthError::Gateway`] on transport failures.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        name: &str,
    ) -> Result<Option<AuthSession>, AuthError> {
        let url = self.endpoint("/auth/v1/signup");
        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&json!({
                "email": email.as_str(),
                "password": password,
                "data": { "name": name },
            }))
            .send()
            .await
            .map_err(SupabaseError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AuthErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| "Não foi possível criar a conta.".to_string());
            warn!(status = %status, "sign-up rejected");
            return Err(AuthError::Rejected(message));
        }

        let token: TokenResponse = response.json().await.map_err(SupabaseError::Http)?;

        // No access token means the project requires email confirmation
        // before a session exists
        if token.access_token.is_none() {
            debug!("sign-up ok, no session returned");
            return Ok(None);
        }

        let access_token = token.access_token.clone();
        let session = session_from_token(token)?;

        if let Some(access) = access_token {
            self.set_access_token(Some(SecretString::from(access)));
        }

        debug!(user_id = %session.user_id, "sign-up ok with session");
        Ok(Some(session))
    }

    /// Sign out of the backend and drop the stored access token.
    ///
    /// The remote call is best-effort: a failure is logged and swallowed,
    /// because local logout must always succeed.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) {
        if self.has_access_token() {
            let url = self.endpoint("/auth/v1/logout");
            let result = self.request(reqwest::Method::POST, &url).send().await;
            match result {
                Ok(response) if !response.status().is_success() => {
                    warn!(status = %response.status(), "remote sign-out failed");
                }
                Err(err) => warn!(error = %err, "remote sign-out failed"),
                Ok(_) => debug!("remote sign-out ok"),
            }
        }
        self.set_access_token(None);
    }
}

/// Build an [`AuthSession`] out of a token response.
fn session_from_token(token: TokenResponse) -> Result<AuthSession, AuthError> {
    let user = token.user.ok_or_else(|| {
        AuthError::Gateway(SupabaseError::Api {
            status: 200,
            message: "token response without user".to_string(),
        })
    })?;

    let user_id = UserId::parse(&user.id).map_err(|e| {
        AuthError::Gateway(SupabaseError::Api {
            status: 200,
            message: format!("malformed user id in token response: {e}"),
        })
    })?;

    Ok(AuthSession {
        user_id,
        email: user.email,
        name: user.user_metadata.name,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_from_token_requires_user() {
        let token = TokenResponse {
            access_token: Some("t".to_string()),
            user: None,
        };
        assert!(matches!(
            session_from_token(token),
            Err(AuthError::Gateway(SupabaseError::Api { .. }))
        ));
    }

    #[test]
    fn test_session_from_token_parses_identity() {
        let token: TokenResponse = serde_json::from_str(
            r#"{
                "access_token": "jwt",
                "user": {
                    "id": "550e8400-e29b-41d4-a716-446655440000",
                    "email": "user@example.com",
                    "user_metadata": { "name": "Maria" }
                }
            }"#,
        )
        .unwrap();

        let session = session_from_token(token).unwrap();
        assert_eq!(
            session.user_id.to_string(),
            "550e8400-e29b-41d4-a716-446655440000"
        );
        assert_eq!(session.email.as_deref(), Some("user@example.com"));
        assert_eq!(session.name.as_deref(), Some("Maria"));
    }

    #[test]
    fn test_session_from_token_rejects_bad_id() {
        let token: TokenResponse = serde_json::from_str(
            r#"{ "access_token": "jwt", "user": { "id": "nope" } }"#,
        )
        .unwrap();
        assert!(session_from_token(token).is_err());
    }
}
