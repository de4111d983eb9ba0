//! Author publishing flow: upload the cover and the PDF, then create the
//! catalog row.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use tracing::{info, warn};

use livraria_core::{Price, UserId};

use crate::supabase::rows::NewBookRow;
use crate::supabase::{Returning, SupabaseClient, SupabaseError};

/// Everything the publish screen collects for a new title.
#[derive(Debug, Clone, Default)]
pub struct NewBookForm {
    pub title: String,
    /// Author display name as it should appear in the catalog.
    pub author_name: String,
    pub genre: Option<String>,
    pub publisher: Option<String>,
    pub synopsis: Option<String>,
    pub year: Option<i32>,
    pub pages: Option<i64>,
    pub price: Price,
    /// Cover image, when one was picked.
    pub cover: Option<FileUpload>,
    /// The book itself. Required.
    pub pdf: FileUpload,
}

/// A picked file ready to upload; the path contributes only the extension.
#[derive(Debug, Clone, Default)]
pub struct FileUpload {
    pub source_path: PathBuf,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("informe o título do livro")]
    EmptyTitle,
    #[error("o arquivo PDF é obrigatório")]
    EmptyPdf,
    #[error(transparent)]
    Gateway(#[from] SupabaseError),
}

/// Publish a book on behalf of the signed-in author.
///
/// The cover goes to the cover bucket; the PDF goes to the PDF bucket,
/// falling back to the cover bucket when that upload is rejected (some
/// deployments only provision the one public bucket). Only after both
/// uploads succeed is the `livros` row inserted, so the catalog never
/// references objects that failed to land.
///
/// # Errors
///
/// [`PublishError::EmptyTitle`] / [`PublishError::EmptyPdf`] before any
/// network traffic; [`PublishError::Gateway`] when an upload or the insert
/// fails.
pub async fn publish_book(
    client: &SupabaseClient,
    author_id: UserId,
    form: NewBookForm,
) -> Result<(), PublishError> {
    let title = form.title.trim().to_string();
    if title.is_empty() {
        return Err(PublishError::EmptyTitle);
    }
    if form.pdf.bytes.is_empty() {
        return Err(PublishError::EmptyPdf);
    }

    let capa_url = match form.cover {
        Some(cover) => {
            let path = object_path(author_id, "capa", &cover.source_path, "jpg");
            Some(
                client
                    .upload(client.cover_bucket(), &path, cover.bytes, false)
                    .await?,
            )
        }
        None => None,
    };

    let pdf_path = object_path(author_id, "livro", &form.pdf.source_path, "pdf");
    let pdf_url = match client
        .upload(client.pdf_bucket(), &pdf_path, form.pdf.bytes.clone(), false)
        .await
    {
        Ok(url) => url,
        Err(err) => {
            warn!(error = %err, "pdf bucket rejected the upload, using the cover bucket");
            client
                .upload(client.cover_bucket(), &pdf_path, form.pdf.bytes, false)
                .await?
        }
    };

    let row = NewBookRow {
        titulo: title,
        autor: form.author_name,
        genero: form.genre,
        editora: form.publisher,
        sinopse: form.synopsis,
        ano: form.year,
        paginas: form.pages,
        preco: form.price.amount().to_f64().unwrap_or(0.0),
        capa_url,
        pdf_url,
        autor_id: author_id.to_string(),
    };
    client.insert("livros", &[row], Returning::Minimal).await?;

    info!(author_id = %author_id, "book published");
    Ok(())
}

/// Storage path for an uploaded asset: unique per upload, grouped by
/// author, extension from the picked file.
fn object_path(author_id: UserId, kind: &str, source: &Path, default_ext: &str) -> String {
    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .map_or_else(|| default_ext.to_string(), str::to_lowercase);
    format!(
        "{author_id}/{kind}-{}.{ext}",
        Utc::now().timestamp_millis()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn author() -> UserId {
        UserId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap()
    }

    #[test]
    fn test_object_path_shape() {
        let path = object_path(author(), "capa", &PathBuf::from("/tmp/Capa.JPEG"), "jpg");
        assert!(path.starts_with("550e8400-e29b-41d4-a716-446655440000/capa-"));
        assert!(path.ends_with(".jpeg"));
    }

    #[test]
    fn test_object_path_default_extension() {
        let path = object_path(author(), "livro", &PathBuf::from("/tmp/livro"), "pdf");
        assert!(path.ends_with(".pdf"));
    }
}
