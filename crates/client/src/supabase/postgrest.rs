//! Generic PostgREST table interface.
//!
//! A thin builder over `GET/POST/PATCH/DELETE /rest/v1/{table}`. Filters
//! are equality and pattern-match only, ordering by a single column -
//! exactly what the screens need, nothing more.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::{SupabaseClient, SupabaseError};

/// How much of the affected rows an insert/upsert should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Returning {
    /// `Prefer: return=minimal` - no body.
    Minimal,
    /// `Prefer: return=representation` - the written rows.
    Representation,
}

impl Returning {
    /// The `Prefer` header value for an insert.
    const fn prefer_header(self) -> &'static str {
        match self {
            Self::Minimal => "return=minimal",
            Self::Representation => "return=representation",
        }
    }
}

/// `Prefer` header for an upsert: merge on conflict and return the row.
const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=representation";

/// Builder for a single-table read.
#[must_use = "a query builder does nothing until fetched"]
pub struct QueryBuilder {
    client: SupabaseClient,
    table: String,
    columns: String,
    query: Vec<(String, String)>,
}

impl QueryBuilder {
    /// Restrict the returned columns (PostgREST select syntax, embedded
    /// resources included, e.g. `"id, livros(id, titulo)"`).
    pub fn select(mut self, columns: &str) -> Self {
        self.columns = columns.to_string();
        self
    }

    /// Equality filter: `column = value`.
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.query
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    /// Case-insensitive pattern match: `column ILIKE pattern` (`%` wildcards).
    pub fn ilike(mut self, column: &str, pattern: &str) -> Self {
        self.query
            .push((column.to_string(), format!("ilike.{pattern}")));
        self
    }

    /// Order by a column.
    pub fn order(mut self, column: &str, descending: bool) -> Self {
        let direction = if descending { "desc" } else { "asc" };
        self.query
            .push(("order".to_string(), format!("{column}.{direction}")));
        self
    }

    /// Cap the number of returned rows.
    pub fn limit(mut self, n: usize) -> Self {
        self.query.push(("limit".to_string(), n.to_string()));
        self
    }

    /// Execute the read and decode the rows.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError`] on transport failure or a non-success
    /// status.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<Vec<T>, SupabaseError> {
        let client = self.client.clone();
        let url = client.endpoint(&format!("/rest/v1/{}", self.table));
        let query = self.into_query_pairs();

        let response = client
            .request(reqwest::Method::GET, &url)
            .query(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SupabaseClient::error_from_response(response).await);
        }

        let rows: Vec<T> = response.json().await?;
        debug!(count = rows.len(), "fetched rows");
        Ok(rows)
    }

    /// Execute the read expecting exactly one row.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::NotFound`] when no row matches, and the
    /// usual transport errors otherwise.
    pub async fn fetch_single<T: DeserializeOwned>(self) -> Result<T, SupabaseError> {
        let table = self.table.clone();
        let mut rows: Vec<T> = self.limit(1).fetch().await?;
        rows.pop()
            .ok_or_else(|| SupabaseError::NotFound(format!("no matching row in {table}")))
    }

    /// The final query-string pairs as sent to PostgREST, `select` last.
    fn into_query_pairs(self) -> Vec<(String, String)> {
        let mut query = self.query;
        query.push(("select".to_string(), self.columns));
        query
    }
}

impl SupabaseClient {
    /// Start a read against a table.
    pub fn from(&self, table: &str) -> QueryBuilder {
        QueryBuilder {
            client: self.clone(),
            table: table.to_string(),
            columns: "*".to_string(),
            query: Vec::new(),
        }
    }

    /// Insert rows into a table.
    ///
    /// Multi-row inserts run inside a single transaction on the backend,
    /// so a batch either lands completely or not at all.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError`] on transport failure or a non-success
    /// status; nothing is written in the latter case.
    #[instrument(skip(self, rows))]
    pub async fn insert<T: Serialize>(
        &self,
        table: &str,
        rows: &[T],
        returning: Returning,
    ) -> Result<(), SupabaseError> {
        let url = self.endpoint(&format!("/rest/v1/{table}"));

        let response = self
            .request(reqwest::Method::POST, &url)
            .header("Prefer", returning.prefer_header())
            .json(rows)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        debug!(table, count = rows.len(), "inserted rows");
        Ok(())
    }

    /// Insert-or-update a single row keyed on `on_conflict`, returning the
    /// written row.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError`] on transport failure, a non-success
    /// status, or an empty representation.
    #[instrument(skip(self, row))]
    pub async fn upsert<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        row: &T,
        on_conflict: &str,
    ) -> Result<R, SupabaseError> {
        let url = self.endpoint(&format!("/rest/v1/{table}"));

        let response = self
            .request(reqwest::Method::POST, &url)
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", UPSERT_PREFER)
            .json(&[row])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let mut rows: Vec<R> = response.json().await?;
        rows.pop()
            .ok_or_else(|| SupabaseError::NotFound(format!("upsert into {table} returned no row")))
    }

    /// Update rows matching an equality filter.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError`] on transport failure or a non-success
    /// status.
    #[instrument(skip(self, changes))]
    pub async fn update<T: Serialize>(
        &self,
        table: &str,
        filter_column: &str,
        filter_value: &str,
        changes: &T,
    ) -> Result<(), SupabaseError> {
        let url = self.endpoint(&format!("/rest/v1/{table}"));

        let response = self
            .request(reqwest::Method::PATCH, &url)
            .query(&[(filter_column, format!("eq.{filter_value}"))])
            .header("Prefer", "return=minimal")
            .json(changes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        Ok(())
    }

    /// Delete rows matching an equality filter.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError`] on transport failure or a non-success
    /// status.
    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        table: &str,
        filter_column: &str,
        filter_value: &str,
    ) -> Result<(), SupabaseError> {
        let url = self.endpoint(&format!("/rest/v1/{table}"));

        let response = self
            .request(reqwest::Method::DELETE, &url)
            .query(&[(filter_column, format!("eq.{filter_value}"))])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use url::Url;

    use crate::config::Config;

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
    fn test_default_select_is_star() {
        let pairs = test_client().from("livros").into_query_pairs();
        assert_eq!(pairs, vec![("select".to_string(), "*".to_string())]);
    }

    #[test]
    fn test_combinators_assemble_pairs_with_select_last() {
        let pairs = test_client()
            .from("livros")
            .select("id, titulo")
            .eq("autor_id", "u1")
            .ilike("genero", "%terror%")
            .order("created_at", true)
            .limit(5)
            .into_query_pairs();

        assert_eq!(
            pairs,
            vec![
                ("autor_id".to_string(), "eq.u1".to_string()),
                ("genero".to_string(), "ilike.%terror%".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
                ("limit".to_string(), "5".to_string()),
                ("select".to_string(), "id, titulo".to_string()),
            ]
        );
    }

    #[test]
    fn test_order_direction() {
        let pairs = test_client()
            .from("livros")
            .order("created_at", false)
            .into_query_pairs();
        assert_eq!(pairs[0], ("order".to_string(), "created_at.asc".to_string()));
    }

    #[test]
    fn test_duplicate_filters_accumulate() {
        let pairs = test_client()
            .from("livros")
            .eq("genero", "Terror")
            .eq("genero", "Suspense")
            .into_query_pairs();

        assert_eq!(pairs[0], ("genero".to_string(), "eq.Terror".to_string()));
        assert_eq!(pairs[1], ("genero".to_string(), "eq.Suspense".to_string()));
    }

    #[test]
    fn test_eq_accepts_typed_ids() {
        let pairs = test_client()
            .from("minha_biblioteca")
            .eq("livro_id", livraria_core::BookId::new(42))
            .into_query_pairs();
        assert_eq!(pairs[0], ("livro_id".to_string(), "eq.42".to_string()));
    }

    #[test]
    fn test_prefer_headers() {
        assert_eq!(Returning::Minimal.prefer_header(), "return=minimal");
        assert_eq!(
            Returning::Representation.prefer_header(),
            "return=representation"
        );
        assert_eq!(
            UPSERT_PREFER,
            "resolution=merge-duplicates,return=representation"
        );
    }
}
