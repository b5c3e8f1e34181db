use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use super::{
    jwt::JwtKeys,
    password::{hash_password, verify_password},
    repo_types::{TokenRow, User},
};
use crate::error::{is_unique_violation, AppError, AppResult};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn register(db: &PgPool, email: &str, password: &str) -> AppResult<User> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(AppError::Validation("Invalid email".into()));
    }
    if password.is_empty() {
        return Err(AppError::Validation("Password is required".into()));
    }

    if User::find_by_email(db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("User already exists".into()));
    }

    let hash = hash_password(password)?;
    let user = match User::create(db, &email, &hash).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %email, "email registered concurrently");
            return Err(AppError::Conflict("User already exists".into()));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Verifies credentials and returns `(access_token, user_id)`.
pub async fn login(
    db: &PgPool,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> AppResult<(String, i64)> {
    let email = normalize_email(email);
    let invalid = || AppError::Unauthorized("Invalid email or password".into());

    let Some(user) = User::find_by_email(db, &email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(invalid());
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(email = %email, user_id = user.id, "login invalid password");
        return Err(invalid());
    }

    let token = issue_or_reuse_token(db, keys, &user).await?;
    info!(user_id = user.id, "user logged in");
    Ok((token, user.id))
}

/// Hands back the user's latest token while it is still valid, otherwise mints a new one.
pub async fn issue_or_reuse_token(db: &PgPool, keys: &JwtKeys, user: &User) -> AppResult<String> {
    if let Some(existing) = TokenRow::latest_for_user(db, user.id).await? {
        if keys.inspect(&existing.token).valid_for(user.id).is_some() {
            debug!(user_id = user.id, token_id = existing.id, "reusing token");
            return Ok(existing.token);
        }
    }

    let now = OffsetDateTime::now_utc();
    let token = keys.sign_at(user.id, now)?;

    let mut tx = db.begin().await?;
    let pruned = TokenRow::prune_older_than_tx(&mut tx, user.id, now - keys.ttl).await?;
    let row = TokenRow::insert_tx(&mut tx, user.id, &token).await?;
    tx.commit().await?;

    debug!(user_id = user.id, token_id = row.id, pruned, "token issued");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::claims::TokenStatus, config::JwtConfig};
    use time::Duration as TimeDuration;

    #[test]
    fn email_normalization_and_format() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
        assert!(is_valid_email("a@b.io"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email(""));
    }

    #[tokio::test]
    async fn register_rejects_bad_input_before_touching_db() {
        let state = crate::state::AppState::fake();

        let err = register(&state.db, "not-an-email", "pw").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = register(&state.db, "a@b.io", "").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn expired_token_is_replaced_and_pruned(pool: PgPool) {
        let keys = JwtKeys::from_config(&JwtConfig {
            secret: "s".into(),
            issuer: "iss".into(),
            ttl_minutes: 60,
        });
        let user = User::create(&pool, "rotate@example.com", "hash").await.unwrap();

        let stale = keys
            .sign_at(user.id, OffsetDateTime::now_utc() - TimeDuration::hours(2))
            .unwrap();
        sqlx::query(
            "INSERT INTO tokens (user_id, token, created_at) VALUES ($1, $2, now() - interval '2 hours')",
        )
        .bind(user.id)
        .bind(&stale)
        .execute(&pool)
        .await
        .unwrap();

        let fresh = issue_or_reuse_token(&pool, &keys, &user).await.unwrap();
        assert_ne!(fresh, stale);
        assert!(matches!(keys.inspect(&fresh), TokenStatus::Valid(_)));
        assert_eq!(issue_or_reuse_token(&pool, &keys, &user).await.unwrap(), fresh);

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tokens WHERE user_id = $1")
            .bind(user.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 1);
    }
}
