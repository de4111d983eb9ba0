//! Account registration.
//!
//! The whole sign-up flow in one place: local validation, auth account
//! creation, the optional avatar, and the profile row. Validation failures
//! never generate network traffic.

use std::path::PathBuf;

use tracing::{info, warn};

use livraria_core::{
    BirthDate, BirthDateError, Cpf, CpfError, Email, EmailError, PasswordStrength, Role,
};

use crate::models::User;
use crate::services::avatar::upload_avatar;
use crate::supabase::rows::{NewProfileRow, ProfileRow};
use crate::supabase::{AuthError, SupabaseClient, SupabaseError};

/// Raw form input, exactly as the screen collected it.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub name: String,
    pub cpf: String,
    /// `DD/MM/YYYY`.
    pub birth_date: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    /// Picked image, when the user chose one.
    pub avatar: Option<AvatarImage>,
}

/// An image picked on the device, ready to upload.
#[derive(Debug, Clone, Default)]
pub struct AvatarImage {
    /// Original path, used only for the file extension.
    pub source_path: PathBuf,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("informe seu nome")]
    EmptyName,
    #[error("CPF inválido: {0}")]
    InvalidCpf(#[from] CpfError),
    #[error("data de nascimento inválida: {0}")]
    InvalidBirthDate(#[from] BirthDateError),
    #[error("e-mail inválido: {0}")]
    InvalidEmail(#[from] EmailError),
    #[error("a senha é muito fraca")]
    WeakPassword(PasswordStrength),
    #[error("as senhas não coincidem")]
    PasswordMismatch,
    #[error(transparent)]
    Auth(AuthError),
    #[error(transparent)]
    Gateway(#[from] SupabaseError),
}

impl From<AuthError> for RegistrationError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidEmail(inner) => Self::InvalidEmail(inner),
            other => Self::Auth(other),
        }
    }
}

/// The form after local validation, every field in canonical shape.
#[derive(Debug, Clone)]
struct ValidatedForm {
    name: String,
    cpf: Cpf,
    birth_date: BirthDate,
    email: Email,
    password: String,
    avatar: Option<AvatarImage>,
}

impl RegistrationForm {
    /// Check every field locally. First failure wins, in screen order:
    /// name, CPF, birth date, email, password strength, confirmation.
    fn validate(self) -> Result<ValidatedForm, RegistrationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(RegistrationError::EmptyName);
        }

        let cpf = Cpf::parse(&self.cpf)?;
        let birth_date = BirthDate::parse(&self.birth_date)?;
        let email = Email::parse(&self.email)?;

        let strength = PasswordStrength::measure(&self.password);
        if !strength.is_acceptable() {
            return Err(RegistrationError::WeakPassword(strength));
        }
        if self.password != self.password_confirmation {
            return Err(RegistrationError::PasswordMismatch);
        }

        Ok(ValidatedForm {
            name,
            cpf,
            birth_date,
            email,
            password: self.password,
            avatar: self.avatar,
        })
    }
}

/// Create an account end to end and return the signed-in user.
///
/// The flow mirrors the sign-up screen: validate locally, create the auth
/// account (falling back to a plain sign-in when the project withholds the
/// session, so re-registering an existing address still works), upload the
/// avatar best-effort, then upsert the profile row keyed on the auth id
/// and build the user from the row the backend wrote. The caller installs
/// the returned user into the session store.
///
/// # Errors
///
/// Per-field validation errors before any network traffic;
/// [`RegistrationError::Auth`] when the backend refuses the account;
/// [`RegistrationError::Gateway`] when the profile write fails. Avatar
/// upload failure is logged and never fails the registration.
pub async fn register(
    client: &SupabaseClient,
    form: RegistrationForm,
) -> Result<User, RegistrationError> {
    let form = form.validate()?;

    let auth = match client.sign_up(&form.email, &form.password, &form.name).await? {
        Some(session) => session,
        None => client.sign_in(&form.email, &form.password).await?,
    };
    info!(user_id = %auth.user_id, "auth account ready");

    let avatar_url = match form.avatar {
        Some(image) => {
            match upload_avatar(client, auth.user_id, image.bytes, &image.source_path).await {
                Ok(url) => Some(url),
                Err(err) => {
                    warn!(error = %err, "avatar upload failed, registering without one");
                    None
                }
            }
        }
        None => None,
    };

    let profile: ProfileRow = client
        .upsert(
            "usuarios",
            &NewProfileRow {
                id: auth.user_id.to_string(),
                nome: form.name,
                cpf: form.cpf.as_str().to_string(),
                data_nascimento: form.birth_date.to_iso(),
                email: form.email.as_str().to_string(),
                tipo_usuario: Role::Reader.as_db_str(),
                avatar_url,
                progresso_leitor: 0.0,
            },
            "id",
        )
        .await?;

    Ok(User::from_profile(&auth, &form.email, Some(profile)))
}
