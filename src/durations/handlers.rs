use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{DurationResponse, UpdateDurationRequest, UpdateDurationResponse},
    services,
};
use crate::{
    error::{AppJson, AppResult},
    state::AppState,
};

pub fn duration_routes() -> Router<AppState> {
    Router::new()
        .route("/duration/user/:user_id", get(get_today))
        .route("/duration/update", post(update_duration))
}

#[instrument(skip(state))]
pub async fn get_today(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<DurationResponse>> {
    let duration = services::get_or_create_today(&state.db, user_id).await?;
    Ok(Json(duration.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_duration(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateDurationRequest>,
) -> AppResult<Json<UpdateDurationResponse>> {
    let (duration_id, user_id, total_time) = services::required_update_fields(payload)?;
    let new_total_time = services::update(&state.db, duration_id, user_id, &total_time).await?;
    Ok(Json(UpdateDurationResponse {
        message: "Duration updated successfully".into(),
        new_total_time,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    use crate::{
        app::{build_app, testing::{get, post_json}},
        auth::repo_types::User,
        state::AppState,
    };

    #[tokio::test]
    async fn update_with_missing_fields_is_bad_request() {
        let app = build_app(AppState::fake());
        let (status, body) = post_json(
            &app,
            "/api/duration/update",
            json!({ "duration_id": 1, "total_time": "00:01:00" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");
    }

    #[tokio::test]
    async fn update_with_wrongly_typed_field_is_bad_request() {
        let app = build_app(AppState::fake());
        let (status, body) = post_json(
            &app,
            "/api/duration/update",
            json!({ "duration_id": "1", "user_id": 2, "total_time": "00:01:00" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("expected i64"));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn get_then_update_over_http(pool: PgPool) {
        let user = User::create(&pool, "t@example.com", "hash").await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let app = build_app(AppState::for_pool(pool, dir.path()).await);

        let uri = format!("/api/duration/user/{}", user.id);
        let (status, first) = get(&app, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["total_time"], "00:00:00");
        let (_, second) = get(&app, &uri).await;
        assert_eq!(first["id"], second["id"]);

        let (status, body) = post_json(
            &app,
            "/api/duration/update",
            json!({ "duration_id": first["id"], "user_id": user.id + 1, "total_time": "00:05:00" }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Duration not found or doesn't belong to user");

        let (status, body) = post_json(
            &app,
            "/api/duration/update",
            json!({ "duration_id": first["id"], "user_id": user.id, "total_time": "00:05:00" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["new_total_time"], "00:05:00");
    }
}
