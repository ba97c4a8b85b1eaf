mod handlers;
mod metrics;
mod routes;

use axum::Router;
use gavel_common::Config;
use gavel_core::{DockerEngine, ProfileRegistry};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

pub struct AppState {
    pub engine: DockerEngine,
    pub profiles: ProfileRegistry,
    pub timeout: Duration,
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Gavel API booting...");

    metrics::init_metrics();
    info!("Metrics registry initialized");

    let config = Config::from_env();

    let profiles = ProfileRegistry::load_or_builtin(Path::new(&config.languages_path));
    info!("Supported languages: {:?}", profiles.supported());

    let engine = DockerEngine::connect().expect("Failed to connect to Docker daemon");
    info!("Connected to Docker");

    let state = Arc::new(AppState {
        engine,
        profiles,
        timeout: Duration::from_millis(config.timeout_ms),
    });

    // Build router
    let app = Router::new().merge(routes::routes()).with_state(state);

    // Start server
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    info!("HTTP server listening on {}", config.bind_addr);
    info!("Ready to accept jobs");

    axum::serve(listener, app).await.expect("Server error");
}
