//! Catalog and library reads.
//!
//! Thin query compositions over the PostgREST builder; all normalization
//! to domain types happens in [`crate::models`].

use livraria_core::{BookId, UserId};

use crate::models::{Book, Order};
use crate::supabase::rows::{BookRow, LibraryEntryRow};
use crate::supabase::{SupabaseClient, SupabaseError};

/// Every `livros` column the domain model reads.
const BOOK_COLUMNS: &str =
    "id, titulo, autor, genero, editora, sinopse, ano, paginas, preco, capa_url, pdf_url, \
     autor_id, created_at";

/// Library rows with the book embedded via the foreign-key relationship.
const LIBRARY_COLUMNS: &str = "id, created_at, livros(id, titulo, autor, genero, editora, \
     sinopse, ano, paginas, preco, capa_url, pdf_url, autor_id, created_at)";

/// The full catalog, newest first.
///
/// # Errors
///
/// Returns [`SupabaseError`] when the read fails.
pub async fn list_books(client: &SupabaseClient) -> Result<Vec<Book>, SupabaseError> {
    let rows: Vec<BookRow> = client
        .from("livros")
        .select(BOOK_COLUMNS)
        .order("created_at", true)
        .fetch()
        .await?;
    Ok(rows.into_iter().map(Book::from).collect())
}

/// Books whose genre contains `genre`, case-insensitively.
///
/// # Errors
///
/// Returns [`SupabaseError`] when the read fails.
pub async fn books_by_genre(
    client: &SupabaseClient,
    genre: &str,
) -> Result<Vec<Book>, SupabaseError> {
    let rows: Vec<BookRow> = client
        .from("livros")
        .select(BOOK_COLUMNS)
        .ilike("genero", &format!("%{genre}%"))
        .fetch()
        .await?;
    Ok(rows.into_iter().map(Book::from).collect())
}

/// The books an author has published, newest first.
///
/// # Errors
///
/// Returns [`SupabaseError`] when the read fails.
pub async fn books_by_author(
    client: &SupabaseClient,
    author_id: UserId,
) -> Result<Vec<Book>, SupabaseError> {
    let rows: Vec<BookRow> = client
        .from("livros")
        .select(BOOK_COLUMNS)
        .eq("autor_id", author_id)
        .order("created_at", true)
        .fetch()
        .await?;
    Ok(rows.into_iter().map(Book::from).collect())
}

/// A single catalog entry by id.
///
/// # Errors
///
/// [`SupabaseError::NotFound`] when no such book exists, other
/// [`SupabaseError`] values when the read fails.
pub async fn get_book(client: &SupabaseClient, id: BookId) -> Result<Book, SupabaseError> {
    let row: BookRow = client
        .from("livros")
        .select(BOOK_COLUMNS)
        .eq("id", id)
        .fetch_single()
        .await?;
    Ok(Book::from(row))
}

/// Everything the user owns, with the book data embedded.
///
/// Entries whose book has been deleted come back without an embedded row
/// and are dropped.
///
/// # Errors
///
/// Returns [`SupabaseError`] when the read fails.
pub async fn my_library(
    client: &SupabaseClient,
    user_id: UserId,
) -> Result<Vec<Order>, SupabaseError> {
    let rows: Vec<LibraryEntryRow> = client
        .from("minha_biblioteca")
        .select(LIBRARY_COLUMNS)
        .eq("user_id", user_id)
        .fetch()
        .await?;
    Ok(rows.into_iter().filter_map(Order::from_row).collect())
}

/// Purchase history, most recent first. Same rows as the library, ordered
/// for the orders screen.
///
/// # Errors
///
/// Returns [`SupabaseError`] when the read fails.
pub async fn my_orders(
    client: &SupabaseClient,
    user_id: UserId,
) -> Result<Vec<Order>, SupabaseError> {
    let rows: Vec<LibraryEntryRow> = client
        .from("minha_biblioteca")
        .select(LIBRARY_COLUMNS)
        .eq("user_id", user_id)
        .order("created_at", true)
        .fetch()
        .await?;
    Ok(rows.into_iter().filter_map(Order::from_row).collect())
}
