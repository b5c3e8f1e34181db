use sqlx::FromRow;
use time::OffsetDateTime;

/// One uploaded image and the keystroke statistics sent with it.
#[derive(Debug, Clone, FromRow)]
pub struct Media {
    pub id: i64,
    pub user_id: i64,
    pub total_input: Option<String>,  // raw keystroke log
    pub number_of_input: Option<i32>, // keystroke count
    pub image_src: String,
    pub created_at: OffsetDateTime,
}

/// Metadata accompanying an upload.
#[derive(Debug, Clone, Default)]
pub struct NewMedia {
    pub user_id: i64,
    pub key_log: Option<String>,
    pub key_counts: Option<i32>,
}
