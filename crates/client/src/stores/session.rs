//! The session store: single source of truth for "who is logged in".

use tracing::{info, warn};

use livraria_core::{Email, UserId};

use crate::models::{User, UserPatch};
use crate::supabase::rows::ProfileRow;
use crate::supabase::{AuthError, AuthSession, SupabaseClient, SupabaseError};

/// The auth/profile operations the session store needs from the backend.
///
/// A trait so tests can drive the store with an in-memory fake;
/// [`SupabaseClient`] is the real implementation.
pub trait SessionGateway {
    /// Verify credentials and return the auth identity.
    fn sign_in(
        &self,
        email: &Email,
        password: &str,
    ) -> impl Future<Output = Result<AuthSession, AuthError>> + Send;

    /// Fetch the profile row for a user, `None` when it does not exist.
    fn fetch_profile(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<ProfileRow>, SupabaseError>> + Send;

    /// End the remote session. Best-effort.
    fn sign_out(&self) -> impl Future<Output = ()> + Send;
}

impl SessionGateway for SupabaseClient {
    async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthSession, AuthError> {
        Self::sign_in(self, email, password).await
    }

    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<ProfileRow>, SupabaseError> {
        let rows: Vec<ProfileRow> = self
            .from("usuarios")
            .select("id, nome, email, avatar_url, progresso_leitor, tipo_usuario, divisao")
            .eq("id", user_id)
            .fetch()
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn sign_out(&self) {
        Self::sign_out(self).await;
    }
}

/// Holds the current authenticated identity for the life of the process.
///
/// At most one user at a time; there is no session switching. All mutation
/// runs to completion on the caller's thread - the async methods await
/// only the gateway, never mid-mutation.
#[derive(Debug, Default)]
pub struct SessionStore {
    current: Option<User>,
}

impl SessionStore {
    /// Create a store with nobody signed in.
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Authenticate against the backend and install the resulting user.
    ///
    /// The email is validated and normalized locally first. Credential
    /// verification is the auth collaborator's job; on success the profile
    /// record is fetched and merged. A missing or unreadable profile does
    /// NOT fail the login - the store degrades to the minimal user built
    /// from the auth identity, so a profile-store outage never locks
    /// anyone out.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEmail`] before any network traffic, and
    /// [`AuthError::Rejected`] / [`AuthError::Gateway`] from the sign-in
    /// call. The current session is left untouched on every error path.
    pub async fn authenticate<G: SessionGateway>(
        &mut self,
        gateway: &G,
        email: &str,
        password: &str,
    ) -> Result<&User, AuthError> {
        let email = Email::parse(email)?;
        let auth = gateway.sign_in(&email, password).await?;

        let profile = match gateway.fetch_profile(auth.user_id).await {
            Ok(row) => row,
            Err(err) => {
                warn!(error = %err, "profile fetch failed, continuing with minimal user");
                None
            }
        };

        let user = User::from_profile(&auth, &email, profile);
        info!(user_id = %user.id, role = %user.role, "session established");
        Ok(self.current.insert(user))
    }

    /// Unconditionally replace the session, e.g. right after registration
    /// so the new account is signed in without a second round trip.
    pub fn set_direct(&mut self, user: User) {
        info!(user_id = %user.id, "session set directly");
        self.current = Some(user);
    }

    /// Shallow-merge the patch into the current user. A no-op when nobody
    /// is signed in; never fails.
    pub fn update(&mut self, patch: UserPatch) {
        if let Some(user) = self.current.as_mut() {
            user.apply(patch);
        }
    }

    /// Sign out remotely (best-effort) and drop the local session.
    pub async fn clear<G: SessionGateway>(&mut self, gateway: &G) {
        gateway.sign_out().await;
        if let Some(user) = self.current.take() {
            info!(user_id = %user.id, "session cleared");
        }
    }

    /// The signed-in user, when there is one.
    #[must_use]
    pub fn current(&self) -> Option<&User> {
        self.current.as_ref()
    }

    /// Whether anyone is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use livraria_core::{ReaderProgress, Role, Tier};

    use super::*;

    /// In-memory gateway: fixed credentials, scriptable profile behavior.
    struct FakeGateway {
        accept_password: &'static str,
        profile: Option<ProfileRow>,
        profile_fails: bool,
        sign_outs: AtomicUsize,
    }

    impl FakeGateway {
        fn new(profile: Option<ProfileRow>) -> Self {
            Self {
                accept_password: "SenhaForte1!",
                profile,
                profile_fails: false,
                sign_outs: AtomicUsize::new(0),
            }
        }
    }

    const USER_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    impl SessionGateway for FakeGateway {
        async fn sign_in(&self, _email: &Email, password: &str) -> Result<AuthSession, AuthError> {
            if password == self.accept_password {
                Ok(AuthSession {
                    user_id: UserId::parse(USER_ID).unwrap(),
                    email: Some("maria@example.com".to_string()),
                    name: Some("Maria".to_string()),
                })
            } else {
                Err(AuthError::Rejected("Invalid login credentials".to_string()))
            }
        }

        async fn fetch_profile(&self, _id: UserId) -> Result<Option<ProfileRow>, SupabaseError> {
            if self.profile_fails {
                Err(SupabaseError::NotFound("boom".to_string()))
            } else {
                Ok(self.profile.clone())
            }
        }

        async fn sign_out(&self) {
            self.sign_outs.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn profile() -> ProfileRow {
        ProfileRow {
            id: USER_ID.to_string(),
            nome: Some("Maria Silva".to_string()),
            email: Some("maria@example.com".to_string()),
            avatar_url: Some("https://cdn/avatar.png".to_string()),
            progresso_leitor: Some(0.3),
            tipo_usuario: Some("autor".to_string()),
            divisao: Some("Bronze".to_string()),
        }
    }

    #[tokio::test]
    async fn test_authenticate_success_merges_profile() {
        let gateway = FakeGateway::new(Some(profile()));
        let mut store = SessionStore::new();

        let user = store
            .authenticate(&gateway, "  Maria@Example.com ", "SenhaForte1!")
            .await
            .unwrap();

        assert_eq!(user.name, "Maria Silva");
        assert_eq!(user.role, Role::Author);
        assert_eq!(user.tier, Tier::Bronze);
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn test_authenticate_rejection_keeps_session_unset() {
        let gateway = FakeGateway::new(Some(profile()));
        let mut store = SessionStore::new();

        let err = store
            .authenticate(&gateway, "maria@example.com", "wrong")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Rejected(msg) if msg == "Invalid login credentials"));
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_authenticate_invalid_email_is_local() {
        let gateway = FakeGateway::new(None);
        let mut store = SessionStore::new();

        let err = store
            .authenticate(&gateway, "not-an-email", "whatever")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)));
    }

    #[tokio::test]
    async fn test_missing_profile_degrades_to_minimal_user() {
        let gateway = FakeGateway::new(None);
        let mut store = SessionStore::new();

        let user = store
            .authenticate(&gateway, "maria@example.com", "SenhaForte1!")
            .await
            .unwrap();

        assert_eq!(user.name, "Maria");
        assert_eq!(user.role, Role::Reader);
        assert_eq!(user.progress.as_f64(), 0.0);
    }

    #[tokio::test]
    async fn test_profile_error_degrades_to_minimal_user() {
        let mut gateway = FakeGateway::new(Some(profile()));
        gateway.profile_fails = true;
        let mut store = SessionStore::new();

        let user = store
            .authenticate(&gateway, "maria@example.com", "SenhaForte1!")
            .await
            .unwrap();
        assert_eq!(user.role, Role::Reader);
    }

    #[tokio::test]
    async fn test_update_without_session_is_noop() {
        let mut store = SessionStore::new();
        store.update(UserPatch {
            name: Some("Ghost".to_string()),
            ..UserPatch::default()
        });
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_update_rederives_tier() {
        let gateway = FakeGateway::new(Some(profile()));
        let mut store = SessionStore::new();
        store
            .authenticate(&gateway, "maria@example.com", "SenhaForte1!")
            .await
            .unwrap();

        store.update(UserPatch {
            progress: Some(ReaderProgress::new(0.9)),
            ..UserPatch::default()
        });
        assert_eq!(store.current().unwrap().tier, Tier::Ouro);
    }

    #[tokio::test]
    async fn test_clear_signs_out_and_drops_user() {
        let gateway = FakeGateway::new(Some(profile()));
        let mut store = SessionStore::new();
        store
            .authenticate(&gateway, "maria@example.com", "SenhaForte1!")
            .await
            .unwrap();

        store.clear(&gateway).await;
        assert!(!store.is_authenticated());
        assert_eq!(gateway.sign_outs.load(Ordering::SeqCst), 1);
    }
}
