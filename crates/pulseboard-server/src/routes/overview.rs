use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use pulseboard_core::metrics::NewOverviewMetrics;

use crate::{error::AppError, state::AppState};

/// `GET /api/v1/overview/latest`: the most recent snapshot, 404 when none
/// has been recorded yet.
#[tracing::instrument(skip(state))]
pub async fn latest(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let latest = state.store.latest_overview().await?;
    latest
        .map(Json)
        .ok_or_else(|| AppError::NotFound("no overview metrics recorded".to_string()))
}

/// `GET /api/v1/overview`: full history, newest first.
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.store.list_overview().await?))
}

/// `POST /api/v1/overview`
#[tracing::instrument(skip(state, body))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewOverviewMetrics>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(new) = body?;
    new.validate()?;
    let created = state.store.insert_overview(new).await?;
    tracing::info!(id = %created.id, "overview metrics recorded");
    Ok((StatusCode::CREATED, Json(created)))
}
