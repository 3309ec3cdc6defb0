use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use pulseboard_core::metrics::HealthStatus;

use crate::state::AppState;

/// `GET /api/v1/health`: liveness check.
///
/// Returns `200 {"status":"healthy"}` when the store answers a ping and
/// `503 {"status":"degraded"}` when it does not.
#[tracing::instrument(skip(state))]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthStatus::healthy())).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Health check: store unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded" })),
            )
                .into_response()
        }
    }
}
