// GET /api/summary: the poller's dashboard summary plus in-flight flags.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::platform::Platform;
use crate::web::AppState;

pub async fn get_summary(State(state): State<AppState>) -> impl IntoResponse {
    let summary = state.summary.read().await.clone();

    let scanning: Vec<&'static str> = Platform::SOURCES
        .iter()
        .chain([Platform::All].iter())
        .filter(|p| state.session.is_in_flight(**p))
        .map(|p| p.as_str())
        .collect();

    Json(serde_json::json!({
        "summary": summary,
        "scanning": scanning,
    }))
}
