use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use pulseboard_core::metrics::NewCampaignConversion;

use crate::{error::AppError, state::AppState};

/// `GET /api/v1/campaigns`: oldest first.
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.store.list_campaigns().await?))
}

#[tracing::instrument(skip(state, body))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewCampaignConversion>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(new) = body?;
    new.validate()?;
    let created = state.store.insert_campaign(new).await?;
    tracing::info!(id = %created.id, campaign = %created.campaign, "campaign recorded");
    Ok((StatusCode::CREATED, Json(created)))
}
