//! OAuth install flow: the `/auth` entry point and its callback.
//!
//! A fresh install arrives at `/auth`, is signature-checked, and is redirected
//! to Shopify's authorization page carrying a random nonce as `state`. Shopify
//! sends the merchant back to `/auth/callback`, where the nonce and signature
//! are re-checked before the authorization code is exchanged for a permanent
//! access token. Embedded loads (`embedded=1`) short-circuit to the app shell
//! once a credential exists.

use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use rand::Rng;
use secrecy::ExposeSecret;
use tower_sessions::Session;
use tracing::instrument;

use crate::config::AppConfig;
use crate::db::ShopRepository;
use crate::error::AppError;
use crate::oauth::{exchange, hmac, host};
use crate::routes::shell;
use crate::state::AppState;

/// Session key holding the anti-replay nonce between `/auth` and the callback.
const OAUTH_NONCE_KEY: &str = "oauth_nonce";

/// GET /auth - Install entry point.
///
/// Verifies the request signature over all query parameters, then either
/// serves the embedded shell (installed shops only), or starts a fresh
/// install by redirecting to Shopify's authorization page.
#[instrument(skip_all, fields(shop = params.get("shop").map(String::as_str)))]
pub async fn begin(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Response, AppError> {
    let config = state.config();
    verify_signature(&params, config)?;

    let shop = require_param(&params, "shop")?;

    if params.get("embedded").is_some_and(|v| v == "1") {
        // Embedded loads require an existing install.
        let repo = ShopRepository::new(state.pool());
        if repo.exists(shop).await? {
            return shell::embedded_shell(config).await;
        }
        return Err(AppError::ShopNotFound);
    }

    let nonce = generate_nonce();
    session.insert(OAUTH_NONCE_KEY, nonce.clone()).await?;

    let url = authorize_url(shop, config, &nonce);
    tracing::info!("Redirecting to Shopify authorization page");
    Ok(found(&url))
}

/// GET /auth/callback - OAuth callback from Shopify.
///
/// Order matters: the `state` nonce is checked before anything else (the
/// anti-replay/CSRF defense), then the signature, and only then does the
/// outbound code exchange run. A failed exchange leaves no credential behind.
#[instrument(skip_all, fields(shop = params.get("shop").map(String::as_str)))]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Response, AppError> {
    let config = state.config();

    let stored_nonce: Option<String> = session.get(OAUTH_NONCE_KEY).await?;
    let nonce_matches = match (&stored_nonce, params.get("state")) {
        (Some(nonce), Some(callback_state)) => hmac::constant_time_compare(nonce, callback_state),
        _ => false,
    };
    if !nonce_matches {
        return Err(AppError::InvalidState);
    }
    // The nonce is single-use; drop it before doing anything else.
    let _: Option<String> = session.remove(OAUTH_NONCE_KEY).await?;

    verify_signature(&params, config)?;

    let shop = require_param(&params, "shop")?;
    let code = require_param(&params, "code")?;
    let host_param = require_param(&params, "host")?;

    let token = exchange::exchange_code(
        state.http(),
        shop,
        &config.client_id,
        config.client_secret.expose_secret(),
        code,
    )
    .await?;

    // First install wins; a repeated embedded load never overwrites the
    // stored token.
    let repo = ShopRepository::new(state.pool());
    repo.insert_if_absent(shop, &token.access_token, &config.scopes, Utc::now())
        .await?;
    tracing::info!("Install completed");

    let decoded_host = host::decode_host(host_param)?;
    Ok(found(&embedded_app_url(&decoded_host, &config.client_id)))
}

/// A plain `302 Found` redirect. (axum's `Redirect` helpers emit 303/307/308;
/// the install flow uses the classic 302 the platform documents.)
fn found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

/// Check the `hmac` query parameter against the shared secret. A missing
/// signature fails closed the same way a bad one does.
fn verify_signature(
    params: &BTreeMap<String, String>,
    config: &AppConfig,
) -> Result<(), AppError> {
    let claimed = params.get("hmac").ok_or(AppError::InvalidSignature)?;
    if hmac::verify_params(params, claimed, config.client_secret.expose_secret()) {
        Ok(())
    } else {
        Err(AppError::InvalidSignature)
    }
}

fn require_param<'a>(
    params: &'a BTreeMap<String, String>,
    name: &'static str,
) -> Result<&'a str, AppError> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or(AppError::MissingParam(name))
}

/// A fresh 128-bit nonce as 32 lowercase hex characters.
fn generate_nonce() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    hex::encode(bytes)
}

/// Shopify's authorization page for a shop, carrying the nonce as `state`.
fn authorize_url(shop: &str, config: &AppConfig, nonce: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("client_id", &config.client_id)
        .append_pair("scope", &config.scopes)
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("state", nonce)
        .finish();
    format!("https://{shop}/admin/oauth/authorize?{query}")
}

/// Where the merchant lands after install: the app's page under the decoded
/// admin host.
fn embedded_app_url(decoded_host: &str, client_id: &str) -> String {
    format!("https://{decoded_host}/apps/{client_id}/")
}
