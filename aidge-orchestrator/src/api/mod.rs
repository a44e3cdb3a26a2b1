//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod batch;
pub mod error;
pub mod health;
pub mod task;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::BatchOrchestrator;

/// Create the main API router with all endpoints
pub fn create_router(orchestrator: BatchOrchestrator) -> Router {
    Router::new()
        // Service info
        .route("/", get(health::index))
        .route("/health", get(health::health_check))
        // Task endpoints
        .route("/api/process", post(task::process_task))
        // Batch endpoints
        .route("/api/batch", post(batch::submit_batch))
        .route("/api/batch/{batch_id}", get(batch::get_batch))
        // Add state and middleware
        .with_state(orchestrator)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
