use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument};

use crate::{
    auth::{
        dto::{CredentialsRequest, LoginResponse, MessageResponse, PublicUser},
        extractors::AuthUser,
        jwt::JwtKeys,
        repo_types::User,
        services,
    },
    error::{AppError, AppJson, AppResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    services::register(&state.db, &payload.email, &payload.password).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CredentialsRequest>,
) -> AppResult<Json<LoginResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let (access_token, user_id) =
        services::login(&state.db, &keys, &payload.email, &payload.password).await?;
    Ok(Json(LoginResponse {
        access_token,
        user_id,
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, user_id).await?.ok_or_else(|| {
        error!(user_id, "token owner no longer exists");
        AppError::Unauthorized("User not found".into())
    })?;

    Ok(Json(PublicUser {
        id: user.id,
        email: user.email,
    }))
}
