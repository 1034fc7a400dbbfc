// HTTP surface: status codes and payloads from the axum router.

#![cfg(feature = "web")]

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower::ServiceExt;

use common::{session_with, MockBackend};
use threatscope::poller::DashboardSummary;
use threatscope::web::{build_router, AppState};

fn app(backend: Arc<MockBackend>) -> Router {
    let (session, _) = session_with(backend);
    build_router(AppState {
        session: Arc::new(session),
        summary: Arc::new(RwLock::new(DashboardSummary::default())),
    })
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ============================================================
// Liveness and page
// ============================================================

#[tokio::test]
async fn health_is_always_ok() {
    let backend = MockBackend::new();
    let response = app(backend.clone()).oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn dashboard_page_renders_html() {
    let response = app(MockBackend::new()).oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("id=\"resultsSection\" hidden"));
    assert!(html.contains("id=\"dashboardSummary\""));
}

// ============================================================
// Scans
// ============================================================

#[tokio::test]
async fn scan_returns_normalized_result() {
    let backend = MockBackend::new();
    backend.respond("/youtube/scan", common::youtube_payload());
    let app = app(backend.clone());

    let response = app
        .clone()
        .oneshot(post("/api/scan?platform=youtube&query=abuse&limit=8"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["stale"], false);
    assert_eq!(body["result"]["platform"], "youtube");
    assert_eq!(body["result"]["outcome"]["status"], "completed");
    assert_eq!(backend.calls()[0].1[1], ("limit", "8".to_string()));

    let results = app.oneshot(get("/api/results")).await.unwrap();
    assert_eq!(results.status(), StatusCode::OK);
    assert_eq!(body_json(results).await["items_scanned"], 8);
}

#[tokio::test]
async fn scan_without_platform_runs_aggregate() {
    let backend = MockBackend::new();
    backend.respond("/scan/all", common::aggregate_payload());

    let response = app(backend.clone()).oneshot(post("/api/scan")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["result"]["platform"], "all");
    assert_eq!(backend.calls()[0].0, "/scan/all");
}

#[tokio::test]
async fn unknown_platform_is_bad_request() {
    let backend = MockBackend::new();
    let response = app(backend.clone())
        .oneshot(post("/api/scan?platform=myspace"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn unreachable_backend_is_bad_gateway() {
    let backend = MockBackend::new();
    backend.fail("/twitter/scan", "connection refused");

    let app = app(backend);
    let response = app
        .clone()
        .oneshot(post("/api/scan?platform=twitter"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_json(response).await["guidance"].is_string());

    let view = body_json(app.oneshot(get("/api/view")).await.unwrap()).await;
    assert_eq!(view["state"]["state"], "unreachable");
}

#[tokio::test]
async fn backend_reported_failure_is_still_ok() {
    let backend = MockBackend::new();
    backend.respond("/gnews/scan", json!({"success": false, "error": "quota"}));

    let response = app(backend)
        .oneshot(post("/api/scan?platform=gnews"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["result"]["outcome"]["status"], "failed");
    assert_eq!(body["result"]["outcome"]["error"], "quota");
}

#[tokio::test]
async fn concurrent_scan_of_same_platform_conflicts() {
    let backend = MockBackend::new();
    let gate = backend.gate("/reddit/scan");
    let app = app(backend.clone());

    let first = tokio::spawn(app.clone().oneshot(post("/api/scan?platform=reddit")));
    while backend.call_count() < 1 {
        tokio::task::yield_now().await;
    }

    let second = app
        .clone()
        .oneshot(post("/api/scan?platform=reddit"))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let summary = body_json(app.oneshot(get("/api/summary")).await.unwrap()).await;
    assert_eq!(summary["scanning"], json!(["reddit"]));

    gate.notify_one();
    assert_eq!(first.await.unwrap().unwrap().status(), StatusCode::OK);
}

// ============================================================
// Results and reports
// ============================================================

#[tokio::test]
async fn results_and_report_are_404_before_any_scan() {
    let app = app(MockBackend::new());

    let results = app.clone().oneshot(get("/api/results")).await.unwrap();
    assert_eq!(results.status(), StatusCode::NOT_FOUND);

    let report = app.oneshot(get("/api/report")).await.unwrap();
    assert_eq!(report.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn report_downloads_markdown_attachment() {
    let backend = MockBackend::new();
    backend.respond("/reddit/scan", common::reddit_payload());
    let app = app(backend.clone());

    app.clone()
        .oneshot(post("/api/scan?platform=reddit"))
        .await
        .unwrap();
    let calls = backend.call_count();

    let response = app.oneshot(get("/api/report")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"Threat-Report-reddit-"));
    assert!(disposition.ends_with(".md\""));

    let text = body_text(response).await;
    assert!(text.starts_with("# REDDIT Threat Analysis Report"));
    assert_eq!(backend.call_count(), calls);
}
