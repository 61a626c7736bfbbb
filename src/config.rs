//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `APP_CLIENT_ID` - Shopify OAuth client ID
//! - `APP_CLIENT_SECRET` - Shopify OAuth client secret (signs requests and the code exchange)
//! - `APP_REDIRECT_URI` - OAuth callback URL registered with Shopify
//! - `APP_SCOPES` - Requested access scopes (comma-separated)
//! - `SECRET_KEY` - Session cookie signing key (min 32 chars)
//!
//! ## Optional
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 5000)
//! - `DATABASE_URL` - `SQLite` connection string (default: sqlite:shop_gateway.db)
//! - `STATIC_DIR` - Directory holding the embedded app shell (default: static)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Application configuration.
///
/// Built once at startup and injected into handlers through `AppState`;
/// handler logic never reads the environment directly.
#[derive(Clone)]
pub struct AppConfig {
    /// Shopify OAuth client ID.
    pub client_id: String,
    /// Shopify OAuth client secret (signature verification + code exchange).
    pub client_secret: SecretString,
    /// OAuth callback URL registered with Shopify.
    pub redirect_uri: String,
    /// Access scopes requested at install time.
    pub scopes: String,
    /// Session cookie signing key.
    pub session_secret: SecretString,
    /// `SQLite` connection string.
    pub database_url: String,
    /// IP address to bind the server to.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Directory holding the built frontend (embedded app shell).
    pub static_dir: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("session_secret", &"[REDACTED]")
            .field("database_url", &self.database_url)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("static_dir", &self.static_dir)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the session key is too short.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PORT", "5000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;

        let session_secret = get_required_secret("SECRET_KEY")?;
        validate_session_secret(&session_secret, "SECRET_KEY")?;

        Ok(Self {
            client_id: get_required_env("APP_CLIENT_ID")?,
            client_secret: get_required_secret("APP_CLIENT_SECRET")?,
            redirect_uri: get_required_env("APP_REDIRECT_URI")?,
            scopes: get_required_env("APP_SCOPES")?,
            session_secret,
            database_url: get_env_or_default("DATABASE_URL", "sqlite:shop_gateway.db"),
            host,
            port,
            static_dir: PathBuf::from(get_env_or_default("STATIC_DIR", "static")),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the app is served over HTTPS (drives the session cookie's
    /// `Secure` flag).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.redirect_uri.starts_with("https://")
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that the session signing key meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig {
            client_id: "test_client_id".to_string(),
            client_secret: SecretString::from("test_client_secret"),
            redirect_uri: "https://app.example.com/auth/callback".to_string(),
            scopes: "read_products".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            database_url: "sqlite::memory:".to_string(),
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            static_dir: PathBuf::from("static"),
        }
    }

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_session_secret(&secret, "TEST_KEY").is_err());
    }

    #[test]
    fn test_validate_session_secret_valid_length() {
        let secret = SecretString::from("a".repeat(32));
        assert!(validate_session_secret(&secret, "TEST_KEY").is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 5000);
    }

    #[test]
    fn test_is_secure_follows_redirect_uri_scheme() {
        let mut config = test_config();
        assert!(config.is_secure());
        config.redirect_uri = "http://localhost:5000/auth/callback".to_string();
        assert!(!config.is_secure());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = test_config();
        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("test_client_id"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("test_client_secret"));
    }
}
