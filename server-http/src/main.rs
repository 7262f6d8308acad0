use server_http::{build_router, AppState};
use shared::config::Config;
use std::sync::Arc;
use tracing::{error, info, Level};
use upstream::HttpMarketSource;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Starting market proxy HTTP server...");

    // Load environment variables from .env file (if exists)
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    // Load configuration from environment variables; a missing or malformed
    // required setting is fatal here, never a per-request error.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("invalid configuration: {err}");
            std::process::exit(1);
        }
    };
    info!(
        cache_ttl_secs = config.cache_ttl.as_secs(),
        wait_between_calls_secs = config.wait_between_calls.as_secs(),
        "Configuration loaded"
    );

    // Wire the cache, throttle and upstream client into the application
    let state = AppState::new(&config, Arc::new(HttpMarketSource::new()));

    // Build router
    let router = build_router(state);

    // Start server
    let addr = format!("{}:{}", config.host, config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    info!("HTTP Server listening on http://{addr}");
    info!("Try: curl http://{addr}/markets?page=1");

    // Graceful shutdown handler
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    info!("Server shutdown complete");
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    info!("Shutting down gracefully...");
}
