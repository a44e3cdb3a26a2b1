//! Batch API Handlers
//!
//! Background batch submission and lookup.

use aidge_core::domain::batch::BatchRecord;
use aidge_core::domain::task::TaskSpec;
use aidge_core::dto::batch::{BatchAccepted, BatchRequest};
use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::error::{ApiError, ApiResult};
use crate::service::BatchOrchestrator;

/// POST /api/batch
/// Register a batch and process it in the background
pub async fn submit_batch(
    State(orchestrator): State<BatchOrchestrator>,
    Json(req): Json<BatchRequest>,
) -> ApiResult<Json<BatchAccepted>> {
    if req.max_concurrent == Some(0) {
        return Err(ApiError::BadRequest(
            "max_concurrent must be greater than 0".to_string(),
        ));
    }

    let specs: Vec<TaskSpec> = req.requests.into_iter().map(TaskSpec::from).collect();
    tracing::info!("Submitting batch with {} task(s)", specs.len());

    let batch_id = orchestrator.start_batch(specs, req.max_concurrent).await?;

    Ok(Json(BatchAccepted::new(batch_id)))
}

/// GET /api/batch/{batch_id}
/// Get a batch record
pub async fn get_batch(
    State(orchestrator): State<BatchOrchestrator>,
    Path(batch_id): Path<String>,
) -> ApiResult<Json<BatchRecord>> {
    tracing::debug!("Getting batch: {}", batch_id);

    let record = orchestrator.batch(&batch_id).await.ok_or_else(|| {
        tracing::warn!("Unknown batch id: {}", batch_id);
        ApiError::NotFound(format!("Batch {} not found", batch_id))
    })?;

    Ok(Json(record))
}
