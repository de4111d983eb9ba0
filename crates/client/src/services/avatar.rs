//! Avatar upload.
//!
//! One object per user at a fixed path, overwritten in place. Because the
//! path never changes, the returned URL carries a cache-busting query
//! param so stale copies are not shown after an update.

use std::path::Path;

use chrono::Utc;

use livraria_core::UserId;

use crate::supabase::{SupabaseClient, SupabaseError};

/// Upload an avatar image and return its public URL.
///
/// The object lands at `{user_id}/avatar.{ext}` in the avatar bucket with
/// upsert enabled, so re-uploading replaces the previous image. Call sites
/// treat failure as non-fatal.
///
/// # Errors
///
/// Returns [`SupabaseError`] when the upload is rejected or the transport
/// fails.
pub async fn upload_avatar(
    client: &SupabaseClient,
    user_id: UserId,
    bytes: Vec<u8>,
    source_path: &Path,
) -> Result<String, SupabaseError> {
    let object_path = avatar_object_path(user_id, source_path);
    let url = client
        .upload(client.avatar_bucket(), &object_path, bytes, true)
        .await?;
    Ok(format!("{url}?cb={}", Utc::now().timestamp_millis()))
}

/// The storage path for a user's avatar, extension taken from the picked
/// file (lowercased, `jpg` when absent).
fn avatar_object_path(user_id: UserId, source_path: &Path) -> String {
    let ext = source_path
        .extension()
        .and_then(|e| e.to_str())
        .map_or_else(|| "jpg".to_string(), str::to_lowercase);
    format!("{user_id}/avatar.{ext}")
}
