//! Task API Handlers
//!
//! Synchronous single-task processing.

use aidge_core::domain::task::TaskSpec;
use aidge_core::dto::task::{ProcessResponse, TaskRequest};
use axum::{Json, extract::State};

use crate::api::error::ApiResult;
use crate::service::BatchOrchestrator;

/// POST /api/process
/// Submit one task and poll it until it finishes
pub async fn process_task(
    State(orchestrator): State<BatchOrchestrator>,
    Json(req): Json<TaskRequest>,
) -> ApiResult<Json<ProcessResponse>> {
    tracing::info!("Processing task for {}", req.api_name);

    let (handle, result) = orchestrator.process_task(TaskSpec::from(req)).await?;

    Ok(Json(ProcessResponse {
        task_id: handle.task_id,
        result,
    }))
}
