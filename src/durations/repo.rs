use sqlx::PgPool;
use time::Date;

use super::repo_types::Duration;

pub const EMPTY_TOTAL_TIME: &str = "00:00:00";

impl Duration {
    /// Returns the row for `(user_id, date)`, creating it on first use.
    pub async fn get_or_create(db: &PgPool, user_id: i64, date: Date) -> sqlx::Result<Duration> {
        // the no-op update makes RETURNING yield the existing row on conflict
        sqlx::query_as::<_, Duration>(
            r#"
            INSERT INTO durations (user_id, total_time, date)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, date) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id, user_id, total_time, date
            "#,
        )
        .bind(user_id)
        .bind(EMPTY_TOTAL_TIME)
        .bind(date)
        .fetch_one(db)
        .await
    }

    /// Overwrites `total_time` when the row exists and belongs to `user_id`.
    pub async fn update_total_time(
        db: &PgPool,
        id: i64,
        user_id: i64,
        total_time: &str,
    ) -> sqlx::Result<Option<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            UPDATE durations
            SET total_time = $3
            WHERE id = $1 AND user_id = $2
            RETURNING total_time
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(total_time)
        .fetch_optional(db)
        .await
    }
}
