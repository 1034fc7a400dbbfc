// GET /api/report: markdown report of the cached scan, as a download.
//
// 404 when there is no successful scan to report on.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use tracing::error;

use crate::report::{artifact_filename, finalize, DocumentRenderer, MarkdownRenderer};
use crate::web::{api_error, AppState};

pub async fn download_report(State(state): State<AppState>) -> Response {
    let document = match state.session.build_report().await {
        Ok(document) => document,
        Err(e) => return api_error(StatusCode::NOT_FOUND, &e.to_string()),
    };

    let renderer = MarkdownRenderer::default();
    let artifact = match renderer.render(&document) {
        Ok(artifact) => finalize(artifact),
        Err(e) => {
            error!(error = %e, "Failed to render report");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to render report");
        }
    };

    let filename = artifact_filename(document.platform, Utc::now().date_naive(), renderer.extension());
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        artifact.to_bytes(),
    )
        .into_response()
}
