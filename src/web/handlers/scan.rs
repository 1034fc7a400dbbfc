// POST /api/scan?platform=&query=&limit=: run one scan inline.
//
// 200 with the normalized result (a backend-reported failure is still 200;
// check `result.outcome.status`).
// 400 for an unknown platform, before any backend call.
// 409 if a scan for the same platform is already running.
// 502 if the backend could not be reached.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::error::DashboardError;
use crate::session::ScanAttempt;
use crate::web::{api_error, AppState};

#[derive(Deserialize, Default)]
pub struct ScanParams {
    /// Defaults to the aggregate scan.
    pub platform: Option<String>,
    pub query: Option<String>,
    pub limit: Option<u32>,
}

pub async fn trigger_scan(
    State(state): State<AppState>,
    Query(params): Query<ScanParams>,
) -> Response {
    let platform = params.platform.as_deref().unwrap_or("all");

    match state
        .session
        .scan(platform, params.query.as_deref(), params.limit)
        .await
    {
        Ok(ScanAttempt::Completed(result)) => Json(serde_json::json!({
            "stale": false,
            "result": result,
        }))
        .into_response(),
        Ok(ScanAttempt::Stale(result)) => Json(serde_json::json!({
            "stale": true,
            "result": result,
        }))
        .into_response(),
        Ok(ScanAttempt::Ignored) => api_error(
            StatusCode::CONFLICT,
            "A scan for this platform is already running",
        ),
        Err(e @ DashboardError::UnknownPlatform(_)) => {
            api_error(StatusCode::BAD_REQUEST, &e.to_string())
        }
        Err(e @ DashboardError::NetworkFailure(_)) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({
                "error": e.to_string(),
                "guidance": e.guidance(),
            })),
        )
            .into_response(),
        Err(e) => api_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    }
}
