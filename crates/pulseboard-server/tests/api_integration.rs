use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use pulseboard_core::metrics::{
    CampaignConversion, NewCampaignConversion, NewOverviewMetrics, NewRevenueDataPoint,
    OverviewMetrics, RevenueDataPoint,
};
use pulseboard_core::store::MetricsStore;
use pulseboard_duckdb::DuckDbBackend;
use pulseboard_server::app::build_app;
use pulseboard_server::config::Config;
use pulseboard_server::state::AppState;

fn test_config() -> Config {
    Config {
        port: 0,
        data_dir: "/tmp/pulseboard-test".to_string(),
        duckdb_memory_limit: "256MB".to_string(),
        cors_origins: vec![],
    }
}

fn test_app() -> axum::Router {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    build_app(Arc::new(AppState::new(db, test_config())))
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse JSON")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

#[tokio::test]
async fn root_reports_running() {
    let response = test_app().oneshot(get("/")).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["message"], "API is running");
}

#[tokio::test]
async fn health_is_healthy_with_reachable_store() {
    let response = test_app()
        .oneshot(get("/api/v1/health"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");
}

struct UnreachableStore;

#[async_trait]
impl MetricsStore for UnreachableStore {
    async fn ping(&self) -> anyhow::Result<()> {
        anyhow::bail!("database file locked")
    }
    async fn insert_overview(&self, _: NewOverviewMetrics) -> anyhow::Result<OverviewMetrics> {
        anyhow::bail!("unreachable")
    }
    async fn list_overview(&self) -> anyhow::Result<Vec<OverviewMetrics>> {
        anyhow::bail!("unreachable")
    }
    async fn latest_overview(&self) -> anyhow::Result<Option<OverviewMetrics>> {
        anyhow::bail!("unreachable")
    }
    async fn insert_campaign(
        &self,
        _: NewCampaignConversion,
    ) -> anyhow::Result<CampaignConversion> {
        anyhow::bail!("unreachable")
    }
    async fn list_campaigns(&self) -> anyhow::Result<Vec<CampaignConversion>> {
        anyhow::bail!("unreachable")
    }
    async fn insert_revenue(&self, _: NewRevenueDataPoint) -> anyhow::Result<RevenueDataPoint> {
        anyhow::bail!("unreachable")
    }
    async fn list_revenue(&self) -> anyhow::Result<Vec<RevenueDataPoint>> {
        anyhow::bail!("unreachable")
    }
}

#[tokio::test]
async fn unreachable_store_degrades_health_and_fails_reads() {
    let state = Arc::new(AppState::with_store(Arc::new(UnreachableStore), test_config()));
    let app = build_app(state);

    let response = app
        .clone()
        .oneshot(get("/api/v1/health"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["status"], "degraded");

    let response = app
        .oneshot(get("/api/v1/revenue"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "internal_error");
}

#[tokio::test]
async fn latest_overview_is_404_before_first_snapshot() {
    let response = test_app()
        .oneshot(get("/api/v1/overview/latest"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn overview_create_then_read_latest_and_history() {
    let app = test_app();

    for (revenue, growth) in [(90000.0, 2.5), (95000.0, -1.5)] {
        let response = app
            .clone()
            .oneshot(post(
                "/api/v1/overview",
                json!({"revenue": revenue, "users": 8000, "conversions": 900, "growth": growth}),
            ))
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        assert!(created["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert!(created["date"].as_str().is_some());
        assert_eq!(created["revenue"], revenue);
    }

    let latest = json_body(
        app.clone()
            .oneshot(get("/api/v1/overview/latest"))
            .await
            .expect("request"),
    )
    .await;
    assert_eq!(latest["revenue"], 95000.0);
    assert_eq!(latest["growth"], -1.5);

    let history = json_body(app.oneshot(get("/api/v1/overview")).await.expect("request")).await;
    let revenues: Vec<f64> = history
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|m| m["revenue"].as_f64())
        .collect();
    assert_eq!(revenues, vec![95000.0, 90000.0]);
}

#[tokio::test]
async fn campaigns_are_listed_in_insertion_order() {
    let app = test_app();
    for (name, conversions) in [("Spring Launch", 150), ("Holiday", 280)] {
        let response = app
            .clone()
            .oneshot(post(
                "/api/v1/campaigns",
                json!({"campaign": name, "conversions": conversions}),
            ))
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    let list = json_body(app.oneshot(get("/api/v1/campaigns")).await.expect("request")).await;
    let names: Vec<&str> = list
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|c| c["campaign"].as_str())
        .collect();
    assert_eq!(names, vec!["Spring Launch", "Holiday"]);
}

#[tokio::test]
async fn revenue_tags_round_trip_and_are_omitted_when_absent() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(post(
            "/api/v1/revenue",
            json!({"revenue": 45000.0, "source": "subscription", "region": "EU"}),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = app
        .clone()
        .oneshot(post("/api/v1/revenue", json!({"revenue": 52000.0})))
        .await
        .expect("request");
    let untagged = json_body(response).await;
    assert!(untagged.get("source").is_none());

    let list = json_body(app.oneshot(get("/api/v1/revenue")).await.expect("request")).await;
    assert_eq!(list[0]["source"], "subscription");
    assert_eq!(list[0]["region"], "EU");
    assert_eq!(list[1]["revenue"], 52000.0);
}

#[tokio::test]
async fn negative_revenue_is_rejected_with_field() {
    let response = test_app()
        .oneshot(post("/api/v1/revenue", json!({"revenue": -5.0})))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["field"], "revenue");
}

#[tokio::test]
async fn blank_campaign_name_is_rejected() {
    let response = test_app()
        .oneshot(post(
            "/api/v1/campaigns",
            json!({"campaign": "   ", "conversions": 3}),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["field"], "campaign");
}

#[tokio::test]
async fn malformed_body_uses_error_envelope() {
    let response = test_app()
        .oneshot(post("/api/v1/overview", json!({"revenue": "lots"})))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "validation_error");
    assert!(body["error"]["field"].is_null());
}
