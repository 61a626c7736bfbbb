//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /auth                   - Install entry point (verify, embed or redirect to Shopify)
//! GET  /auth/callback          - OAuth callback (state + HMAC checks, code exchange)
//! POST /webhooks/uninstalled   - App uninstall webhook (deletes the credential)
//! GET  /api/hello              - Placeholder API endpoint
//! GET  /*                      - Embedded app shell (static index.html)
//! ```

pub mod api;
pub mod install;
pub mod shell;
pub mod webhooks;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth", get(install::begin))
        .route("/auth/callback", get(install::callback))
        .route("/webhooks/uninstalled", post(webhooks::uninstalled))
        .route("/api/hello", get(api::hello))
        .fallback(shell::catch_all)
}
