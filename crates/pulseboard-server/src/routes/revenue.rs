use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use pulseboard_core::metrics::NewRevenueDataPoint;

use crate::{error::AppError, state::AppState};

/// `GET /api/v1/revenue`: oldest first.
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.store.list_revenue().await?))
}

#[tracing::instrument(skip(state, body))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewRevenueDataPoint>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(new) = body?;
    new.validate()?;
    let created = state.store.insert_revenue(new).await?;
    tracing::info!(id = %created.id, revenue = created.revenue, "revenue recorded");
    Ok((StatusCode::CREATED, Json(created)))
}
