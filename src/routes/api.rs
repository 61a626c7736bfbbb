//! Placeholder API surface consumed by the frontend shell.

use axum::Json;
use serde_json::{Value, json};

/// GET /api/hello - Smoke-test endpoint for the frontend.
pub async fn hello() -> Json<Value> {
    Json(json!({ "message": "Hello, this is from backend!" }))
}
