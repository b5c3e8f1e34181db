use askama::Template;
use axum::{extract::State, response::Html, routing::get, Json, Router};
use tracing::instrument;

use super::{
    dto::{DashboardResponse, HourlyTotal},
    services,
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate<'a> {
    hourly: &'a [HourlyTotal],
    recent_images: &'a [String],
}

/// HTML page at the site root.
pub fn page_routes() -> Router<AppState> {
    Router::new().route("/", get(dashboard_page))
}

/// JSON view, nested under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard_json))
}

#[instrument(skip(state))]
pub async fn dashboard_page(State(state): State<AppState>) -> AppResult<Html<String>> {
    let data = services::load(&state.db).await?;
    Ok(Html(render(&data)?))
}

#[instrument(skip(state))]
pub async fn dashboard_json(State(state): State<AppState>) -> AppResult<Json<DashboardResponse>> {
    Ok(Json(services::load(&state.db).await?))
}

pub(crate) fn render(data: &DashboardResponse) -> AppResult<String> {
    let page = DashboardTemplate {
        hourly: &data.hourly,
        recent_images: &data.recent_images,
    };
    page.render()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("render dashboard: {e}")))
}
