use sqlx::PgPool;
use time::{Date, OffsetDateTime};
use tracing::{debug, info, warn};

use super::{dto::UpdateDurationRequest, repo_types::Duration};
use crate::error::{is_foreign_key_violation, AppError, AppResult};

/// Calendar day durations are keyed by (UTC).
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

pub async fn get_or_create_today(db: &PgPool, user_id: i64) -> AppResult<Duration> {
    match Duration::get_or_create(db, user_id, today()).await {
        Ok(d) => {
            debug!(user_id, duration_id = d.id, "duration for today");
            Ok(d)
        }
        Err(e) if is_foreign_key_violation(&e) => {
            warn!(user_id, "duration requested for unknown user");
            Err(AppError::NotFound("User not found".into()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Pulls the required fields out of an update request.
pub fn required_update_fields(req: UpdateDurationRequest) -> AppResult<(i64, i64, String)> {
    match (req.duration_id, req.user_id, req.total_time) {
        (Some(id), Some(user_id), Some(total)) if !total.is_empty() => Ok((id, user_id, total)),
        _ => Err(AppError::Validation("Missing required fields".into())),
    }
}

pub async fn update(
    db: &PgPool,
    duration_id: i64,
    user_id: i64,
    total_time: &str,
) -> AppResult<String> {
    let updated = Duration::update_total_time(db, duration_id, user_id, total_time)
        .await?
        .ok_or_else(|| {
            warn!(duration_id, user_id, "duration missing or owned by another user");
            AppError::NotFound("Duration not found or doesn't belong to user".into())
        })?;

    info!(duration_id, user_id, total_time = %updated, "duration updated");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::User;

    fn req(id: Option<i64>, user: Option<i64>, total: Option<&str>) -> UpdateDurationRequest {
        UpdateDurationRequest {
            duration_id: id,
            user_id: user,
            total_time: total.map(str::to_string),
        }
    }

    #[test]
    fn update_requires_every_field() {
        assert!(required_update_fields(req(Some(1), Some(2), Some("00:10:00"))).is_ok());
        for bad in [
            req(None, Some(2), Some("00:10:00")),
            req(Some(1), None, Some("00:10:00")),
            req(Some(1), Some(2), None),
            req(Some(1), Some(2), Some("")),
        ] {
            assert!(matches!(
                required_update_fields(bad),
                Err(AppError::Validation(_))
            ));
        }
    }

    #[test]
    fn total_time_is_passed_through_unvalidated() {
        let (_, _, total) = required_update_fields(req(Some(1), Some(2), Some("not a time"))).unwrap();
        assert_eq!(total, "not a time");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn same_day_returns_same_record(pool: PgPool) {
        let user = User::create(&pool, "d@example.com", "hash").await.unwrap();

        let first = get_or_create_today(&pool, user.id).await.unwrap();
        let second = get_or_create_today(&pool, user.id).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.total_time, "00:00:00");
        assert_eq!(first.date, today());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn update_checks_ownership(pool: PgPool) {
        let owner = User::create(&pool, "owner@example.com", "hash").await.unwrap();
        let other = User::create(&pool, "other@example.com", "hash").await.unwrap();
        let d = get_or_create_today(&pool, owner.id).await.unwrap();

        let err = update(&pool, d.id, other.id, "01:00:00").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = update(&pool, d.id + 1000, owner.id, "01:00:00").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        assert_eq!(update(&pool, d.id, owner.id, "01:00:00").await.unwrap(), "01:00:00");
        let again = get_or_create_today(&pool, owner.id).await.unwrap();
        assert_eq!(again.total_time, "01:00:00");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn unknown_user_is_not_found(pool: PgPool) {
        let err = get_or_create_today(&pool, 999_999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
