//! Session middleware configuration.
//!
//! Sets up `SQLite`-backed sessions using tower-sessions. The session holds
//! only the ephemeral OAuth nonce, but its cookie must survive the redirect
//! out to Shopify and back, and later loads inside the Shopify admin iframe,
//! so the cookie is SameSite=None + Secure. The cookie is signed with the
//! configured `SECRET_KEY`.

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::AppConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "shop_gateway_session";

/// Session expiry time in seconds (1 hour; the nonce only needs to survive
/// the round trip to Shopify's authorization page).
const SESSION_EXPIRY_SECONDS: i64 = 60 * 60;

/// Create the session layer with a `SQLite` store.
///
/// # Errors
///
/// Returns `sqlx::Error` if the session table migration fails.
///
/// # Panics
///
/// Panics if the session secret is shorter than 32 bytes (prevented by
/// config validation at startup).
pub async fn create_session_layer(
    pool: &SqlitePool,
    config: &AppConfig,
) -> Result<SessionManagerLayer<SqliteStore, SignedCookie>, sqlx::Error> {
    let store = SqliteStore::new(pool.clone());
    store.migrate().await?;

    let key = Key::derive_from(config.session_secret.expose_secret().as_bytes());

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        // SameSite=None: the callback arrives as a cross-site navigation from
        // Shopify, and the shell renders inside the admin iframe.
        .with_same_site(tower_sessions::cookie::SameSite::None)
        .with_secure(config.is_secure())
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_create_session_layer_derives_signing_key_from_secret() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let config = test_config();

        // Building the layer derives the cookie signing key from the
        // configured secret; any secret of at least 32 bytes must work.
        create_session_layer(&pool, &config).await.unwrap();
    }

    fn test_config() -> AppConfig {
        AppConfig {
            client_id: "test_client_id".to_string(),
            client_secret: SecretString::from("test_client_secret"),
            redirect_uri: "https://app.example.com/auth/callback".to_string(),
            scopes: "read_products".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            database_url: "sqlite::memory:".to_string(),
            host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
            port: 5000,
            static_dir: std::path::PathBuf::from("static"),
        }
    }
}
