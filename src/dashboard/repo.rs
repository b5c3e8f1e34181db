use sqlx::PgPool;
use time::OffsetDateTime;

pub const RECENT_IMAGES_LIMIT: i64 = 20;

/// `(hour_of_day, summed number_of_input)` for uploads created at or after `since`.
pub async fn hourly_input_since(db: &PgPool, since: OffsetDateTime) -> sqlx::Result<Vec<(i32, i64)>> {
    sqlx::query_as::<_, (i32, i64)>(
        r#"
        SELECT EXTRACT(HOUR FROM created_at AT TIME ZONE 'UTC')::INT4 AS hour,
               COALESCE(SUM(number_of_input), 0)::INT8 AS total_input
          FROM media
         WHERE created_at >= $1
         GROUP BY 1
        "#,
    )
    .bind(since)
    .fetch_all(db)
    .await
}

pub async fn recent_image_paths(db: &PgPool, limit: i64) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT image_src
          FROM media
         ORDER BY created_at DESC, id DESC
         LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await
}
