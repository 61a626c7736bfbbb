//! Unified error handling for the install gateway.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::oauth::exchange::ExchangeError;
use crate::oauth::host::HostDecodeError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request signature did not verify against the shared secret.
    #[error("Invalid HMAC")]
    InvalidSignature,

    /// Callback `state` did not match the session nonce (anti-replay).
    #[error("Invalid state")]
    InvalidState,

    /// Embedded request for a shop with no stored credential.
    #[error("Shop not found")]
    ShopNotFound,

    /// A required request parameter was absent.
    #[error("Missing parameter: {0}")]
    MissingParam(&'static str),

    /// The `host` token could not be decoded.
    #[error("Invalid host parameter")]
    HostDecode(#[from] HostDecodeError),

    /// The outbound code exchange with Shopify failed.
    #[error("Token exchange failed: {0}")]
    Exchange(#[from] ExchangeError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Session read/write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(
            self,
            Self::Database(_) | Self::Session(_) | Self::Internal(_) | Self::Exchange(_)
        ) {
            tracing::error!(error = %self, "Request error");
        }

        let status = match &self {
            Self::InvalidSignature | Self::InvalidState => StatusCode::UNAUTHORIZED,
            Self::ShopNotFound => StatusCode::NOT_FOUND,
            Self::MissingParam(_) | Self::HostDecode(_) => StatusCode::BAD_REQUEST,
            Self::Exchange(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Don't expose internal error details to clients. Security failures
        // carry the same terse messages the upstream platform expects and
        // nothing about why verification failed.
        let message = match &self {
            Self::InvalidSignature => "Invalid HMAC".to_string(),
            Self::InvalidState => "Invalid state".to_string(),
            Self::ShopNotFound => "Shop not found".to_string(),
            Self::MissingParam(name) => format!("Missing parameter: {name}"),
            Self::HostDecode(_) => "Invalid host parameter".to_string(),
            Self::Exchange(_) => "Token exchange failed".to_string(),
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
