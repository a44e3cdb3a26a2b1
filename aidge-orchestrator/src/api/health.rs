//! Health and Index API Handlers
//!
//! Liveness probe and a short description of the available endpoints.

use axum::Json;
use serde_json::{Value as JsonValue, json};

/// GET /health
/// Health check endpoint
pub async fn health_check() -> Json<JsonValue> {
    Json(json!({ "status": "healthy" }))
}

/// GET /
/// Service description
pub async fn index() -> Json<JsonValue> {
    Json(json!({
        "message": "Aidge task orchestrator",
        "health": "/health",
        "endpoints": [
            "POST /api/process - submit one task and wait for its result",
            "POST /api/batch - run a batch of tasks in the background",
            "GET /api/batch/{batch_id} - batch status and results"
        ],
        "note": "params format depends on the endpoint; image translation expects a list"
    }))
}
