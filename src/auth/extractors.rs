use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::{claims::TokenStatus, jwt::JwtKeys};
use crate::error::AppError;

/// Extracts and validates the bearer token, returning the user ID.
pub struct AuthUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header".into()))?;

        match JwtKeys::from_ref(state).inspect(token) {
            TokenStatus::Valid(claims) => Ok(AuthUser(claims.user_id)),
            TokenStatus::Expired => {
                warn!("expired token presented");
                Err(AppError::Unauthorized("Token expired".into()))
            }
            TokenStatus::Malformed => {
                warn!("invalid token presented");
                Err(AppError::Unauthorized("Invalid token".into()))
            }
        }
    }
}
