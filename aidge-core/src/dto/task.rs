//! Task DTOs

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::task::TaskSpec;

/// A single task as submitted by API callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRequest {
    pub api_name: String,
    /// List or map, depending on the endpoint
    pub params: JsonValue,
    pub query_api: String,
}

impl From<TaskRequest> for TaskSpec {
    fn from(req: TaskRequest) -> Self {
        TaskSpec::new(req.api_name, req.params, req.query_api)
    }
}

/// Result of processing a single task synchronously
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub task_id: String,
    pub result: JsonValue,
}
