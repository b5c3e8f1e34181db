use sqlx::FromRow;
use time::Date;

/// Per-user, per-day accumulator of active time.
#[derive(Debug, Clone, FromRow)]
pub struct Duration {
    pub id: i64,
    pub user_id: i64,
    pub total_time: String, // "HH:MM:SS", stored as sent
    pub date: Date,
}
