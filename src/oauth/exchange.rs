//! Outbound authorization-code exchange with Shopify.
//!
//! On a valid install callback the gateway posts the authorization code to
//! `https://{shop}/admin/oauth/access_token` and receives the permanent
//! (offline) access token. Failures are split so callers can tell a network
//! problem from a protocol one; none of them leaves a partial credential
//! behind.

use serde::Deserialize;
use thiserror::Error;

/// Errors from the code exchange.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The request could not be sent or timed out.
    #[error("token endpoint request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The token endpoint answered with a non-success status.
    #[error("token endpoint returned status {0}")]
    Status(reqwest::StatusCode),

    /// The response body was not the expected JSON shape.
    #[error("token endpoint returned an unreadable body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    /// The response parsed but carried no `access_token` field.
    #[error("token endpoint response did not include an access token")]
    MissingAccessToken,
}

/// Successful token response from Shopify.
#[derive(Debug, Deserialize)]
pub struct AccessToken {
    /// The permanent offline access token.
    pub access_token: String,
    /// Scopes actually granted (may differ from those requested).
    #[serde(default)]
    pub scope: Option<String>,
}

/// The token endpoint for a shop.
#[must_use]
pub fn access_token_url(shop: &str) -> String {
    format!("https://{shop}/admin/oauth/access_token")
}

/// Exchange an authorization code for an access token.
///
/// # Errors
///
/// Returns `ExchangeError` on network failure, a non-2xx response, or a
/// response without an access token.
pub async fn exchange_code(
    http: &reqwest::Client,
    shop: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
) -> Result<AccessToken, ExchangeError> {
    request_token(
        http,
        &access_token_url(shop),
        client_id,
        client_secret,
        code,
    )
    .await
}

/// Post the exchange request to an explicit endpoint URL.
async fn request_token(
    http: &reqwest::Client,
    url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
) -> Result<AccessToken, ExchangeError> {
    let response = http
        .post(url)
        .form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExchangeError::Status(status));
    }

    let body = response.text().await?;
    let value: serde_json::Value = serde_json::from_str(&body)?;
    if value.get("access_token").is_none() {
        return Err(ExchangeError::MissingAccessToken);
    }

    Ok(serde_json::from_value(value)?)
}
