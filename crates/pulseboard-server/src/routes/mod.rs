pub mod campaigns;
pub mod health;
pub mod overview;
pub mod revenue;

use axum::{response::IntoResponse, Json};
use serde_json::json;

/// `GET /`: banner confirming the API process is up.
pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "API is running" }))
}
