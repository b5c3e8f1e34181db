use bytes::Bytes;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use super::repo_types::{Media, NewMedia};
use crate::{
    error::{is_foreign_key_violation, AppError, AppResult},
    state::AppState,
};

pub const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// URL prefix under which stored files are served; also the prefix of `image_src`.
pub const MEDIA_URL_PREFIX: &str = "media";

/// A file part pulled out of an upload request.
pub struct Upload {
    pub filename: String,
    pub body: Bytes,
}

pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Reduces a client supplied filename to a flat ASCII name safe to put on disk.
pub fn sanitize_filename(filename: &str) -> String {
    lazy_static! {
        static ref UNSAFE_RE: Regex = Regex::new(r"[^A-Za-z0-9_.-]").unwrap();
    }
    // NFKD first: accented letters keep their ASCII base
    let ascii: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    UNSAFE_RE
        .replace_all(&joined, "")
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// Validates an upload and returns its sanitized filename.
pub fn checked_filename(upload: Option<&Upload>) -> AppResult<String> {
    let upload = upload.ok_or_else(|| AppError::Validation("No file part in the request".into()))?;
    if upload.filename.is_empty() {
        return Err(AppError::Validation("No file selected".into()));
    }
    let clean = sanitize_filename(&upload.filename);
    if !allowed_file(&upload.filename) || !allowed_file(&clean) {
        return Err(AppError::Validation("Invalid file format".into()));
    }
    Ok(clean)
}

/// Name an upload is stored under; the uuid prefix keeps equal client filenames apart.
pub fn storage_name(upload: Option<&Upload>) -> AppResult<String> {
    let clean = checked_filename(upload)?;
    Ok(format!("{}_{}", Uuid::new_v4().simple(), clean))
}

pub async fn add_media(st: &AppState, upload: Option<Upload>, meta: NewMedia) -> AppResult<Media> {
    let key = storage_name(upload.as_ref())?;
    let body = upload.map(|u| u.body).unwrap_or_default();

    st.storage.put_object(&key, body).await?;
    let image_src = format!("{}/{}", MEDIA_URL_PREFIX, key);

    match Media::insert(&st.db, &meta, &image_src).await {
        Ok(media) => {
            info!(media_id = media.id, user_id = media.user_id, image_src = %media.image_src, "media stored");
            Ok(media)
        }
        Err(e) => {
            if let Err(cleanup) = st.storage.delete_object(&key).await {
                error!(error = %cleanup, key = %key, "failed to remove orphaned upload");
            }
            if is_foreign_key_violation(&e) {
                warn!(user_id = meta.user_id, "upload for unknown user");
                return Err(AppError::Validation("Unknown user".into()));
            }
            Err(e.into())
        }
    }
}
