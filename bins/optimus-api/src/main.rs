mod handlers;
mod metrics;
mod routes;

use anyhow::Context;
use axum::Router;
use optimus_common::config::Config;
use optimus_judge::Judge;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::info;

pub struct AppState {
    pub judge: Judge,
    pub start_time: Instant,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Optimus judge API booting...");

    metrics::init_metrics().context("Failed to register metrics")?;
    info!("Metrics registry initialized");

    let config = Config::from_env();
    info!(
        default_timeout_ms = config.default_timeout_ms,
        compile_timeout_ms = config.compile_timeout_ms,
        python = %config.python_bin,
        javac = %config.javac_bin,
        java = %config.java_bin,
        workspace_root = %config.workspace_root.display(),
        "Configuration loaded"
    );

    let state = Arc::new(AppState {
        judge: Judge::new(config),
        start_time: Instant::now(),
    });

    let app = Router::new().merge(routes::routes()).with_state(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
