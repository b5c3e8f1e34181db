use sqlx::{PgPool, Postgres, Transaction};
use time::OffsetDateTime;

use crate::auth::repo_types::{TokenRow, User};

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Create a new user with hashed password.
    pub async fn create(db: &PgPool, email: &str, password_hash: &str) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }
}

impl TokenRow {
    /// Most recently issued token of a user.
    pub async fn latest_for_user(db: &PgPool, user_id: i64) -> sqlx::Result<Option<TokenRow>> {
        sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT id, user_id, token, created_at
            FROM tokens
            WHERE user_id = $1
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    pub async fn insert_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        token: &str,
    ) -> sqlx::Result<TokenRow> {
        sqlx::query_as::<_, TokenRow>(
            r#"
            INSERT INTO tokens (user_id, token)
            VALUES ($1, $2)
            RETURNING id, user_id, token, created_at
            "#,
        )
        .bind(user_id)
        .bind(token)
        .fetch_one(&mut **tx)
        .await
    }

    /// Drop a user's tokens created before `cutoff`. Returns the number of rows removed.
    pub async fn prune_older_than_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        cutoff: OffsetDateTime,
    ) -> sqlx::Result<u64> {
        let res = sqlx::query(
            r#"
            DELETE FROM tokens
            WHERE user_id = $1 AND created_at < $2
            "#,
        )
        .bind(user_id)
        .bind(cutoff)
        .execute(&mut **tx)
        .await?;
        Ok(res.rows_affected())
    }
}
