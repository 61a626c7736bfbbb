//! Webhook handlers.
//!
//! Shopify delivers webhooks signed with the app's client secret: the
//! `X-Shopify-Hmac-SHA256` header carries a base64 HMAC of the raw body.
//! Unlike the install flow's query-string signature, the webhook signature
//! covers the body bytes, so the handler takes `Bytes` rather than a parsed
//! payload.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::ShopRepository;
use crate::error::AppError;
use crate::oauth::hmac;
use crate::state::AppState;

/// Header carrying the base64 HMAC-SHA256 of the webhook body.
pub const HEADER_HMAC: &str = "X-Shopify-Hmac-SHA256";

/// Header carrying the domain of the shop that triggered the webhook.
pub const HEADER_SHOP_DOMAIN: &str = "X-Shopify-Shop-Domain";

/// POST /webhooks/uninstalled - App uninstall notification.
///
/// Deletes the shop's credential if one exists. A correctly signed webhook
/// always gets a 200, even for unknown shops — Shopify retries on non-2xx,
/// and there is nothing useful to retry here.
#[instrument(skip_all)]
pub async fn uninstalled(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let claimed = headers
        .get(HEADER_HMAC)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::InvalidSignature)?;

    let secret = state.config().client_secret.expose_secret();
    if !hmac::verify_webhook_body(&body, claimed, secret) {
        return Err(AppError::InvalidSignature);
    }

    if let Some(shop) = headers
        .get(HEADER_SHOP_DOMAIN)
        .and_then(|value| value.to_str().ok())
    {
        ShopRepository::new(state.pool()).delete(shop).await?;
        tracing::info!(shop, "App uninstalled, credential deleted");
    }

    Ok(Json(json!({ "message": "Uninstalled" })))
}
