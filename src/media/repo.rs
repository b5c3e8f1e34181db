use sqlx::PgPool;

use super::repo_types::{Media, NewMedia};

impl Media {
    pub async fn insert(db: &PgPool, meta: &NewMedia, image_src: &str) -> sqlx::Result<Media> {
        sqlx::query_as::<_, Media>(
            r#"
            INSERT INTO media (user_id, total_input, number_of_input, image_src)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, total_input, number_of_input, image_src, created_at
            "#,
        )
        .bind(meta.user_id)
        .bind(meta.key_log.as_deref())
        .bind(meta.key_counts)
        .bind(image_src)
        .fetch_one(db)
        .await
    }
}
