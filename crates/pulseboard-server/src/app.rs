use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::get,
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{routes, state::AppState};

/// CORS for the dashboard front end. An empty origin list allows any origin;
/// origins that fail to parse as header values are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// Everything except the root banner lives under `/api/v1`. Middleware runs
/// outermost first: compression, CORS, then `TraceLayer` request logging.
pub fn build_app(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(routes::health::health))
        .route("/overview/latest", get(routes::overview::latest))
        .route(
            "/overview",
            get(routes::overview::list).post(routes::overview::create),
        )
        .route(
            "/campaigns",
            get(routes::campaigns::list).post(routes::campaigns::create),
        )
        .route(
            "/revenue",
            get(routes::revenue::list).post(routes::revenue::create),
        );

    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/", get(routes::root))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(CompressionLayer::new())
        .with_state(state)
}
