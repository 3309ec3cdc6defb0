use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use pulseboard_server::config::Config;
use pulseboard_server::state::AppState;

/// `pulseboard health`: liveness probe for container health checks.
///
/// Calls `GET http://localhost:$PULSEBOARD_PORT/api/v1/health` and exits 0 on
/// HTTP 200, 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("PULSEBOARD_PORT").unwrap_or_else(|_| "8080".to_string());
    let url = format!("http://localhost:{}/api/v1/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }
    // Structured JSON logging. Level controlled via RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pulseboard_server=info".parse()?)
                .add_directive("pulseboard_duckdb=info".parse()?),
        )
        .json()
        .init();

    let cfg = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    std::fs::create_dir_all(&cfg.data_dir)?;
    let db = pulseboard_duckdb::DuckDbBackend::open(&cfg.db_path(), &cfg.duckdb_memory_limit)?;

    let state = Arc::new(AppState::new(db, cfg.clone()));
    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = pulseboard_server::app::build_app(state);

    info!(port = cfg.port, "Pulseboard listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    info!("Pulseboard stopped");
    Ok(())
}
