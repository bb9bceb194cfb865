// Route definitions for the judge API

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/run", post(handlers::run))
        .route("/submit", post(handlers::submit))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::prometheus_metrics))
}
