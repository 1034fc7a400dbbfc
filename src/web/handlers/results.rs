// Read-only views of the current session.
//
// GET /: rendered dashboard page
// GET /api/results: the cached ScanResult (404 when none)
// GET /api/view: the render model as JSON

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;

use crate::render::html::render_page;
use crate::web::{api_error, AppState};

pub async fn dashboard_page(State(state): State<AppState>) -> Html<String> {
    let view = state.session.view().await;
    let summary = state.summary.read().await.clone();
    Html(render_page(&view, Some(&summary)))
}

pub async fn get_results(State(state): State<AppState>) -> Response {
    match state.session.cache().read().await {
        Some(result) => Json(result).into_response(),
        None => api_error(StatusCode::NOT_FOUND, "No scan results cached yet"),
    }
}

pub async fn get_view(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.session.view().await)
}
