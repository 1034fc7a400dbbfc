// Web server: axum dashboard and JSON API.
//
// One SessionController serves every request, so the in-flight guard and
// the scan cache are shared across browser tabs. The summary poller runs
// in the background for the lifetime of the server.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::poller::{DashboardSummary, SummaryPoller};
use crate::session::SessionController;

pub mod handlers;

/// Shared application state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionController>,
    pub summary: Arc<RwLock<DashboardSummary>>,
}

/// Start the poller and the axum server, and block until the server exits.
pub async fn run_server(
    session: Arc<SessionController>,
    poller: Arc<SummaryPoller>,
    port: u16,
    bind: &str,
) -> Result<()> {
    session.restore().await;

    let state = AppState {
        session,
        summary: poller.summary(),
    };
    let poll_task = poller.spawn();

    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("threatscope dashboard listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let served = axum::serve(listener, app).await;
    poll_task.abort();
    served?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::results::dashboard_page))
        .route("/health", get(health))
        .route("/api/results", get(handlers::results::get_results))
        .route("/api/view", get(handlers::results::get_view))
        .route("/api/scan", post(handlers::scan::trigger_scan))
        .route("/api/summary", get(handlers::status::get_summary))
        .route("/api/report", get(handlers::report::download_report))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness check. Always 200, independent of the scanning backend.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}
