//! Catalog item domain type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::warn;

use livraria_core::{BookId, Price, UserId};

use crate::supabase::rows::BookRow;

/// A book in the catalog. Read-only from the client's perspective.
#[derive(Debug, Clone)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub publisher: Option<String>,
    pub synopsis: Option<String>,
    pub year: Option<i32>,
    pub pages: Option<i64>,
    pub price: Price,
    pub cover_url: Option<String>,
    pub pdf_url: Option<String>,
    /// The publishing author's user id, when recorded.
    pub author_id: Option<UserId>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            id: BookId::new(row.id),
            title: row.titulo.unwrap_or_else(|| "Sem título".to_string()),
            author: row.autor.unwrap_or_else(|| "Autor desconhecido".to_string()),
            genre: row.genero,
            publisher: row.editora,
            synopsis: row.sinopse,
            year: row.ano,
            pages: row.paginas,
            price: price_from_raw(row.id, row.preco),
            cover_url: row.capa_url,
            pdf_url: row.pdf_url,
            author_id: row.autor_id.as_deref().and_then(|s| UserId::parse(s).ok()),
            created_at: row.created_at,
        }
    }
}

/// Normalize a raw price column into a [`Price`].
///
/// Missing, non-finite, or negative values become free, with a warning -
/// a bad catalog row must not break browsing.
fn price_from_raw(book_id: i64, raw: Option<f64>) -> Price {
    let Some(value) = raw else {
        return Price::ZERO;
    };

    Decimal::from_f64_retain(value)
        .and_then(|d| Price::new(d.round_dp(2)).ok())
        .unwrap_or_else(|| {
            warn!(book_id, raw = value, "invalid price in catalog row, treating as free");
            Price::ZERO
        })
}
