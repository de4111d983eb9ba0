//! User role, reader progress, and the display tier derived from it.

use core::fmt;

use serde::{Deserialize, Serialize};

/// What a user is allowed to do in the app.
///
/// Stored in the `usuarios` table as a Portuguese string. The raw backend
/// value is never trusted for authorization: anything unrecognized is
/// coerced to [`Role::Reader`] at the boundary via [`Role::from_db`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    /// Can browse, buy, and read.
    #[default]
    #[serde(rename = "leitor")]
    Reader,
    /// Can additionally publish titles.
    #[serde(rename = "autor")]
    Author,
    /// Full access.
    #[serde(rename = "admin")]
    Admin,
}

impl Role {
    /// Normalize a raw backend value, coercing unknown strings to `Reader`.
    #[must_use]
    pub fn from_db(raw: &str) -> Self {
        match raw {
            "autor" => Self::Author,
            "admin" => Self::Admin,
            _ => Self::Reader,
        }
    }

    /// The string stored in the `tipo_usuario` column.
    #[must_use]
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            Self::Reader => "leitor",
            Self::Author => "autor",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

/// Fraction of the reading club progression a user has completed.
///
/// Always within `[0, 1]`; out-of-range input is clamped rather than
/// rejected, because this is a display value fed from external data.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ReaderProgress(f64);

impl ReaderProgress {
    /// Create a progress value, clamping into `[0, 1]`.
    ///
    /// Non-finite input becomes zero.
    #[must_use]
    pub fn new(fraction: f64) -> Self {
        if fraction.is_finite() {
            Self(fraction.clamp(0.0, 1.0))
        } else {
            Self(0.0)
        }
    }

    /// The raw fraction in `[0, 1]`.
    #[must_use]
    pub const fn as_f64(&self) -> f64 {
        self.0
    }

    /// Progress as a whole percentage, for progress bars.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(&self) -> u8 {
        (self.0 * 100.0).round() as u8
    }
}

/// Display-only reading club classification, derived from progress.
///
/// The backend may store a `divisao` string, but the client derives the
/// tier from progress so the two can never disagree on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "Iniciante")]
    Iniciante,
    #[serde(rename = "Bronze")]
    Bronze,
    #[serde(rename = "Prata")]
    Prata,
    #[serde(rename = "Ouro")]
    Ouro,
}

impl Tier {
    /// Derive the tier for a progress value.
    #[must_use]
    pub fn from_progress(progress: ReaderProgress) -> Self {
        match progress.as_f64() {
            p if p < 0.25 => Self::Iniciante,
            p if p < 0.5 => Self::Bronze,
            p if p < 0.75 => Self::Prata,
            _ => Self::Ouro,
        }
    }

    /// User-facing label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Iniciante => "Iniciante",
            Self::Bronze => "Bronze",
            Self::Prata => "Prata",
            Self::Ouro => "Ouro",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
