use std::sync::Arc;

use pulseboard_core::store::MetricsStore;
use pulseboard_duckdb::DuckDbBackend;

use crate::config::Config;

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
pub struct AppState {
    /// Record storage. DuckDB in production; any [`MetricsStore`] in tests.
    pub store: Arc<dyn MetricsStore>,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: DuckDbBackend, config: Config) -> Self {
        Self::with_store(Arc::new(db), config)
    }

    pub fn with_store(store: Arc<dyn MetricsStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
