use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{instrument, warn};

use super::{
    dto::CreatedMediaResponse,
    repo_types::NewMedia,
    services::{add_media, checked_filename, Upload},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub fn write_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/media", post(upload_media))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// Form fields of an upload, before they are checked.
#[derive(Default)]
struct UploadForm {
    file: Option<Upload>,
    user_id: Option<String>,
    key_log: Option<String>,
    key_counts: Option<String>,
}

async fn read_form(mut mp: Multipart) -> AppResult<UploadForm> {
    let malformed = |e: axum::extract::multipart::MultipartError| {
        warn!(error = %e, "malformed multipart body");
        AppError::Validation("Malformed multipart body".into())
    };

    let mut form = UploadForm::default();
    while let Some(field) = mp.next_field().await.map_err(malformed)? {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let body = field.bytes().await.map_err(malformed)?;
                form.file = Some(Upload { filename, body });
            }
            Some("user_id") => form.user_id = Some(field.text().await.map_err(malformed)?),
            Some("key_log") => form.key_log = Some(field.text().await.map_err(malformed)?),
            Some("key_counts") => form.key_counts = Some(field.text().await.map_err(malformed)?),
            _ => {}
        }
    }
    Ok(form)
}

fn parse_int<T: std::str::FromStr>(raw: &str, field: &str) -> AppResult<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| AppError::Validation(format!("{field} must be an integer")))
}

/// POST /api/media (multipart: file, user_id, key_log, key_counts)
#[instrument(skip(state, mp))]
pub async fn upload_media(
    State(state): State<AppState>,
    mp: Multipart,
) -> AppResult<(StatusCode, Json<CreatedMediaResponse>)> {
    let form = read_form(mp).await?;

    // file problems are reported before metadata problems
    checked_filename(form.file.as_ref())?;

    let user_id = match form.user_id.as_deref() {
        Some(raw) if !raw.trim().is_empty() => parse_int::<i64>(raw, "user_id")?,
        _ => return Err(AppError::Validation("user_id is required".into())),
    };
    let key_counts = match form.key_counts.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Some(parse_int::<i32>(raw, "key_counts")?),
        _ => None,
    };

    let meta = NewMedia {
        user_id,
        key_log: form.key_log,
        key_counts,
    };
    let media = add_media(&state, form.file, meta).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedMediaResponse {
            message: "Media added successfully".into(),
            id: media.id,
            image_src: media.image_src,
        }),
    ))
}
