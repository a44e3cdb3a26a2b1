//! Task domain types

use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};

use crate::domain::endpoint::EndpointKind;

/// Remote status value for a task that completed successfully
pub const STATUS_FINISHED: &str = "finished";
/// Remote status value for a task the service gave up on
pub const STATUS_FAILED: &str = "failed";

/// Reason recorded when no task id could be obtained on submission
pub const SUBMISSION_FAILED_REASON: &str = "submission failed";

/// A unit of work to submit to the remote task API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Submit endpoint, e.g. `/ai/image/translation_mllm/batch`
    pub endpoint_name: String,
    /// Endpoint-specific parameters (a list of maps or a map)
    pub parameters: JsonValue,
    /// Status endpoint, e.g. `/ai/image/translation_mllm/results`
    pub status_endpoint_name: String,
}

impl TaskSpec {
    pub fn new(
        endpoint_name: impl Into<String>,
        parameters: JsonValue,
        status_endpoint_name: impl Into<String>,
    ) -> Self {
        Self {
            endpoint_name: endpoint_name.into(),
            parameters,
            status_endpoint_name: status_endpoint_name.into(),
        }
    }

    /// Classification of the submit endpoint
    pub fn submit_kind(&self) -> EndpointKind {
        EndpointKind::classify(&self.endpoint_name)
    }

    /// Classification of the status endpoint
    pub fn status_kind(&self) -> EndpointKind {
        EndpointKind::classify(&self.status_endpoint_name)
    }
}

/// Handle to a task accepted by the remote service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskHandle {
    pub task_id: String,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

impl TaskHandle {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            submitted_at: chrono::Utc::now(),
        }
    }
}

/// Whether a remote `taskStatus` value stops polling
/// Result recorded for a task that never reached a terminal status
pub fn timeout_payload() -> JsonValue {
    json!({ "code": -1, "message": "polling timed out" })
}

pub fn is_terminal_status(status: &str) -> bool {
    status == STATUS_FINISHED || status == STATUS_FAILED
}

/// Final outcome of one task
///
/// Poll timeouts are a `Success` carrying the synthetic timeout payload: the
/// remote call chain completed, it just never reached a terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum TaskOutcome {
    #[serde(rename = "success")]
    Success {
        task_id: String,
        #[serde(rename = "result")]
        raw_result: JsonValue,
    },
    #[serde(rename = "failed")]
    Failure {
        #[serde(rename = "message")]
        reason: String,
    },
}

impl TaskOutcome {
    pub fn success(task_id: impl Into<String>, raw_result: JsonValue) -> Self {
        TaskOutcome::Success {
            task_id: task_id.into(),
            raw_result,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        TaskOutcome::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success { .. })
    }

    /// A `Success` whose result is the poll timeout payload
    pub fn is_timed_out(&self) -> bool {
        matches!(self, TaskOutcome::Success { raw_result, .. } if *raw_result == timeout_payload())
    }
}
