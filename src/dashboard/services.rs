use sqlx::PgPool;
use time::{OffsetDateTime, Time};
use tracing::debug;

use super::{
    dto::{DashboardResponse, HourlyTotal},
    repo,
};
use crate::error::AppResult;

pub fn start_of_day(now: OffsetDateTime) -> OffsetDateTime {
    now.to_offset(time::UtcOffset::UTC).replace_time(Time::MIDNIGHT)
}

/// Spreads per-hour sums over all 24 hours, zero where nothing was uploaded.
pub fn bucket_hours(rows: &[(i32, i64)]) -> Vec<HourlyTotal> {
    let mut totals = [0i64; 24];
    for &(hour, total) in rows {
        if let Some(slot) = usize::try_from(hour).ok().and_then(|h| totals.get_mut(h)) {
            *slot += total;
        }
    }
    totals
        .iter()
        .enumerate()
        .map(|(hour, &total_input)| HourlyTotal {
            hour: format!("{hour}:00"),
            total_input,
        })
        .collect()
}

pub async fn load(db: &PgPool) -> AppResult<DashboardResponse> {
    let since = start_of_day(OffsetDateTime::now_utc());
    let rows = repo::hourly_input_since(db, since).await?;
    let recent_images = repo::recent_image_paths(db, repo::RECENT_IMAGES_LIMIT).await?;
    debug!(hours_with_uploads = rows.len(), recent = recent_images.len(), "dashboard loaded");

    Ok(DashboardResponse {
        hourly: bucket_hours(&rows),
        recent_images,
    })
}
