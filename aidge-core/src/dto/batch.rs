//! Batch DTOs

use serde::{Deserialize, Serialize};

use crate::dto::task::TaskRequest;

/// Request to run a batch of tasks in the background
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub requests: Vec<TaskRequest>,
    /// Dedicated concurrency limit for this batch; the server-wide limit when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent: Option<usize>,
}

/// Acknowledgement returned when a batch is accepted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchAccepted {
    pub batch_id: String,
    pub message: String,
}

impl BatchAccepted {
    pub fn new(batch_id: impl Into<String>) -> Self {
        Self {
            batch_id: batch_id.into(),
            message: "Batch accepted; query its status with the batch id".to_string(),
        }
    }
}
