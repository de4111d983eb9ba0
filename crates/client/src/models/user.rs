//! User domain types.

use std::path::PathBuf;

use tracing::warn;

use livraria_core::{Email, ReaderProgress, Role, Tier, UserId};

use crate::supabase::AuthSession;
use crate::supabase::rows::ProfileRow;

/// Where a user's avatar image lives.
///
/// A freshly picked image is a local file; a stored profile carries a
/// remote URL. Right after registration both can exist, and they are not
/// required to agree - the local one is simply the fresher preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Avatar {
    /// Path on the device, straight from the image picker.
    Local(PathBuf),
    /// Public storage URL.
    Remote(String),
}

/// The signed-in user, as held by the session store.
#[derive(Debug, Clone)]
pub struct User {
    /// Auth UUID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Normalized email address.
    pub email: Email,
    /// Avatar image, when one exists.
    pub avatar: Option<Avatar>,
    /// Reading club progress in `[0, 1]`.
    pub progress: ReaderProgress,
    /// Authorization role, coerced to `Reader` when the backend value is
    /// unrecognized.
    pub role: Role,
    /// Display tier derived from progress.
    pub tier: Tier,
}

impl User {
    /// Build a user from the auth identity plus an optional profile row.
    ///
    /// A missing row produces the minimal fallback user (name from auth
    /// metadata, progress 0, role `Reader`) so login degrades gracefully
    /// when the profile store is unavailable.
    #[must_use]
    pub fn from_profile(auth: &AuthSession, login_email: &Email, row: Option<ProfileRow>) -> Self {
        let Some(row) = row else {
            return Self::minimal(auth, login_email);
        };

        let progress = ReaderProgress::new(row.progresso_leitor.unwrap_or(0.0));
        let email = row
            .email
            .as_deref()
            .and_then(|raw| Email::parse(raw).ok())
            .unwrap_or_else(|| login_email.clone());

        Self {
            id: auth.user_id,
            name: row
                .nome
                .or_else(|| auth.name.clone())
                .unwrap_or_else(|| "Usuário".to_string()),
            email,
            avatar: row.avatar_url.map(Avatar::Remote),
            progress,
            role: Role::from_db(row.tipo_usuario.as_deref().unwrap_or_default()),
            tier: Tier::from_progress(progress),
        }
    }

    /// The minimal user built from the auth identity alone.
    #[must_use]
    pub fn minimal(auth: &AuthSession, login_email: &Email) -> Self {
        warn!(user_id = %auth.user_id, "profile missing, using minimal user");
        let progress = ReaderProgress::default();
        Self {
            id: auth.user_id,
            name: auth.name.clone().unwrap_or_else(|| "Usuário".to_string()),
            email: auth
                .email
                .as_deref()
                .and_then(|raw| Email::parse(raw).ok())
                .unwrap_or_else(|| login_email.clone()),
            avatar: None,
            progress,
            role: Role::default(),
            tier: Tier::from_progress(progress),
        }
    }

    /// Shallow-merge a patch into this user, re-deriving the tier when
    /// progress changes.
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(avatar) = patch.avatar {
            self.avatar = Some(avatar);
        }
        if let Some(progress) = patch.progress {
            self.progress = progress;
            self.tier = Tier::from_progress(progress);
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
    }
}

/// A partial update to the session user. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub avatar: Option<Avatar>,
    pub progress: Option<ReaderProgress>,
    pub role: Option<Role>,
}

impl UserPatch {
    /// Whether the patch carries no fields, so applying it changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.avatar.is_none()
            && self.progress.is_none()
            && self.role.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn auth() -> AuthSession {
        AuthSession {
            user_id: UserId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap(),
            email: Some("auth@example.com".to_string()),
            name: Some("Maria".to_string()),
        }
    }

    fn login_email() -> Email {
        Email::parse("login@example.com").unwrap()
    }

    #[test]
    fn test_from_profile_normalizes_unknown_role() {
        let row = ProfileRow {
            id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            nome: Some("Maria Silva".to_string()),
            email: Some("maria@example.com".to_string()),
            avatar_url: None,
            progresso_leitor: Some(0.6),
            tipo_usuario: Some("superuser".to_string()),
            divisao: None,
        };

        let user = User::from_profile(&auth(), &login_email(), Some(row));
        assert_eq!(user.role, Role::Reader);
        assert_eq!(user.name, "Maria Silva");
        assert_eq!(user.tier, Tier::Prata);
    }

    #[test]
    fn test_missing_profile_falls_back_to_minimal() {
        let user = User::from_profile(&auth(), &login_email(), None);
        assert_eq!(user.name, "Maria");
        assert_eq!(user.email.as_str(), "auth@example.com");
        assert_eq!(user.progress.as_f64(), 0.0);
        assert_eq!(user.role, Role::Reader);
        assert!(user.avatar.is_none());
    }

    #[test]
    fn test_minimal_falls_back_to_login_email() {
        let mut a = auth();
        a.email = None;
        a.name = None;
        let user = User::from_profile(&a, &login_email(), None);
        assert_eq!(user.email.as_str(), "login@example.com");
        assert_eq!(user.name, "Usuário");
    }

    #[test]
    fn test_apply_rederives_tier() {
        let mut user = User::from_profile(&auth(), &login_email(), None);
        assert_eq!(user.tier, Tier::Iniciante);

        user.apply(UserPatch {
            progress: Some(ReaderProgress::new(0.8)),
            ..UserPatch::default()
        });
        assert_eq!(user.tier, Tier::Ouro);
        // Untouched fields survive
        assert_eq!(user.name, "Maria");
    }

    #[test]
    fn test_patch_emptiness() {
        assert!(UserPatch::default().is_empty());
        assert!(
            !UserPatch {
                name: Some("Maria".to_string()),
                ..UserPatch::default()
            }
            .is_empty()
        );
    }
}
