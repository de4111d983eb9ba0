//! Raw row shapes for the tables the app touches.
//!
//! Every field the backend may omit or null is an `Option` here. These
//! types never leave the gateway layer: the models build domain values out
//! of them, normalizing unknowns to documented defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row of `usuarios` (user profiles).
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    pub id: String,
    pub nome: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub progresso_leitor: Option<f64>,
    pub tipo_usuario: Option<String>,
    pub divisao: Option<String>,
}

/// Payload for creating or refreshing a `usuarios` row during registration.
#[derive(Debug, Clone, Serialize)]
pub struct NewProfileRow {
    pub id: String,
    pub nome: String,
    pub cpf: String,
    pub data_nascimento: String,
    pub email: String,
    pub tipo_usuario: &'static str,
    pub avatar_url: Option<String>,
    pub progresso_leitor: f64,
}

/// A row of `livros` (the catalog).
#[derive(Debug, Clone, Deserialize)]
pub struct BookRow {
    pub id: i64,
    pub titulo: Option<String>,
    pub autor: Option<String>,
    pub genero: Option<String>,
    pub editora: Option<String>,
    pub sinopse: Option<String>,
    pub ano: Option<i32>,
    pub paginas: Option<i64>,
    pub preco: Option<f64>,
    pub capa_url: Option<String>,
    pub pdf_url: Option<String>,
    pub autor_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for publishing a new catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct NewBookRow {
    pub titulo: String,
    pub autor: String,
    pub genero: Option<String>,
    pub editora: Option<String>,
    pub sinopse: Option<String>,
    pub ano: Option<i32>,
    pub paginas: Option<i64>,
    pub preco: f64,
    pub capa_url: Option<String>,
    pub pdf_url: String,
    pub autor_id: String,
}

/// A `minha_biblioteca` row carrying only the owned book id, for the
/// checkout reconciler's ownership read.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OwnedBookRow {
    pub livro_id: i64,
}

/// A `minha_biblioteca` row with its embedded book, for the library and
/// orders screens.
#[derive(Debug, Clone, Deserialize)]
pub struct LibraryEntryRow {
    pub id: i64,
    pub created_at: Option<DateTime<Utc>>,
    /// Null when the joined book has been deleted.
    pub livros: Option<BookRow>,
}

/// Payload for one new purchase record.
#[derive(Debug, Clone, Serialize)]
pub struct NewPurchaseRow {
    pub user_id: String,
    pub livro_id: i64,
}
