use serde::{Deserialize, Serialize};
use time::macros::format_description;

use super::repo_types::Duration;

#[derive(Debug, Serialize)]
pub struct DurationResponse {
    pub success: bool,
    pub id: i64,
    pub user_id: i64,
    pub total_time: String,
    pub date: String, // YYYY-MM-DD
}

impl From<Duration> for DurationResponse {
    fn from(d: Duration) -> Self {
        let date = d
            .date
            .format(format_description!("[year]-[month]-[day]"))
            .unwrap_or_else(|_| d.date.to_string());
        Self {
            success: true,
            id: d.id,
            user_id: d.user_id,
            total_time: d.total_time,
            date,
        }
    }
}

/// All fields are optional on the wire so missing ones surface as a 400 with our message.
#[derive(Debug, Deserialize)]
pub struct UpdateDurationRequest {
    pub duration_id: Option<i64>,
    pub user_id: Option<i64>,
    pub total_time: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateDurationResponse {
    pub message: String,
    pub new_total_time: String,
}
