//! Shop Gateway - Shopify app install gateway.
//!
//! Serves the OAuth install flow, the uninstall webhook, and the embedded
//! app shell.
//!
//! # Architecture
//!
//! - Axum web framework
//! - `SQLite` (via sqlx) for shop credentials and session storage
//! - tower-sessions for the signed install-nonce cookie
//! - reqwest for the outbound code exchange with Shopify

#![cfg_attr(not(test), forbid(unsafe_code))]

use shop_gateway::config::AppConfig;
use shop_gateway::middleware::create_session_layer;
use shop_gateway::state::AppState;
use shop_gateway::{app, db};

#[tokio::main]
async fn main() {
    // Load configuration from environment (fatal if incomplete)
    let config = AppConfig::from_env().expect("Failed to load configuration");

    // Initialize tracing with EnvFilter; defaults to info level for our
    // crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shop_gateway=info,tower_http=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // Initialize database connection pool and run migrations
    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    db::MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    tracing::info!("Database ready");

    // Session layer (SQLite-backed, signed cookie)
    let session_layer = create_session_layer(&pool, &config)
        .await
        .expect("Failed to create session layer");

    let addr = config.socket_addr();
    let state = AppState::new(config, pool).expect("Failed to create application state");
    let app = app(state, session_layer);

    tracing::info!("shop-gateway listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
