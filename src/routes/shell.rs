//! Serving of the embedded app shell (the built frontend's index.html).

use axum::Json;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use serde_json::json;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Read and serve the shell's index.html.
///
/// # Errors
///
/// Returns `AppError::Internal` if the shell is missing from the static
/// directory (a deployment problem, not a client one).
pub async fn embedded_shell(config: &AppConfig) -> Result<Response, AppError> {
    let index = config.static_dir.join("index.html");
    match tokio::fs::read_to_string(&index).await {
        Ok(contents) => Ok(Html(contents).into_response()),
        Err(e) => Err(AppError::Internal(format!(
            "failed to read {}: {e}",
            index.display()
        ))),
    }
}

/// Catch-all fallback: any unmatched GET serves the shell so the frontend
/// router can take over; everything else (and unknown API paths) gets a
/// JSON 404.
pub async fn catch_all(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET || uri.path().starts_with("/api") {
        return not_found();
    }

    match embedded_shell(state.config()).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "Shell unavailable for catch-all request");
            not_found()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}
