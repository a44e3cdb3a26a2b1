//! Task submission and status queries

use aidge_core::domain::endpoint::{EndpointKind, is_results_endpoint};
use aidge_core::domain::task::{TaskHandle, is_terminal_status};
use serde_json::{Value as JsonValue, json};
use tracing::{debug, info, warn};

use crate::TaskClient;
use crate::error::{ClientError, Result};
use crate::transport::{HttpMethod, Payload};

/// Parsed answer of one status query
#[derive(Debug, Clone, PartialEq)]
pub struct StatusResponse {
    /// Full response body
    pub body: JsonValue,
    /// `data.taskStatus`, when present
    pub task_status: Option<String>,
}

impl StatusResponse {
    /// Parse a raw status body
    pub fn parse(raw: &str) -> Result<Self> {
        let body: JsonValue = serde_json::from_str(raw)
            .map_err(|e| ClientError::QueryFailed(format!("invalid JSON: {}", e)))?;

        let task_status = body
            .pointer("/data/taskStatus")
            .and_then(JsonValue::as_str)
            .map(str::to_string);

        Ok(Self { body, task_status })
    }

    /// Whether the task reached `finished` or `failed`
    pub fn is_terminal(&self) -> bool {
        self.task_status.as_deref().is_some_and(is_terminal_status)
    }
}

/// Read the task id from a submission body
///
/// Looks at `data.result.taskId` first, then `data.taskId`. Returns `None` for
/// bodies that are not JSON or carry no usable id.
pub fn extract_task_id(raw: &str) -> Option<String> {
    let body: JsonValue = serde_json::from_str(raw).ok()?;

    ["/data/result/taskId", "/data/taskId"]
        .iter()
        .filter_map(|path| body.pointer(path))
        .find_map(|value| match value {
            JsonValue::String(id) if !id.is_empty() => Some(id.clone()),
            JsonValue::Number(id) => Some(id.to_string()),
            _ => None,
        })
}

/// JSON body for a submission
fn submission_body(kind: EndpointKind, parameters: &JsonValue) -> Result<String> {
    let encoded = serde_json::to_string(parameters)
        .map_err(|e| ClientError::ParseError(format!("Failed to encode parameters: {}", e)))?;

    Ok(json!({ kind.submit_param_key(): encoded }).to_string())
}

/// Method and payload of a status query
fn status_request(status_endpoint_name: &str, task_id: &str) -> (HttpMethod, Payload) {
    let method = if is_results_endpoint(status_endpoint_name) {
        HttpMethod::Get
    } else {
        HttpMethod::Post
    };

    let payload = if EndpointKind::classify(status_endpoint_name).queries_with_json_body() {
        Payload::Json(json!({ "task_id": task_id }).to_string())
    } else {
        Payload::Query(vec![("taskId".to_string(), task_id.to_string())])
    };

    (method, payload)
}

impl TaskClient {
    // =============================================================================
    // Task Lifecycle
    // =============================================================================

    /// Submit a task
    ///
    /// # Arguments
    /// * `endpoint_name` - Submit endpoint, e.g. `/ai/image/translation_mllm/batch`
    /// * `parameters` - Endpoint parameters, JSON-encoded into the request body
    ///
    /// # Returns
    /// A handle carrying the task id assigned by the service. Every failure
    /// (transport, malformed body, missing id) is a
    /// [`ClientError::SubmissionFailed`].
    pub async fn submit_task(
        &self,
        endpoint_name: &str,
        parameters: &JsonValue,
    ) -> Result<TaskHandle> {
        let kind = EndpointKind::classify(endpoint_name);
        let body = submission_body(kind, parameters)
            .map_err(|e| ClientError::SubmissionFailed(e.to_string()))?;

        let response = self
            .invoke(endpoint_name, HttpMethod::Post, Payload::Json(body))
            .await
            .map_err(|e| {
                warn!("Submission to {} failed: {}", endpoint_name, e);
                ClientError::SubmissionFailed(e.to_string())
            })?;

        let task_id = extract_task_id(&response.body).ok_or_else(|| {
            warn!(
                "No task id in response from {}: {}",
                endpoint_name, response.body
            );
            ClientError::SubmissionFailed(format!("no task id in response from {}", endpoint_name))
        })?;

        info!("Submitted task {} to {}", task_id, endpoint_name);
        Ok(TaskHandle::new(task_id))
    }

    /// Query the status of a task once
    ///
    /// # Arguments
    /// * `status_endpoint_name` - Status endpoint, e.g. `/ai/image/translation_mllm/results`
    /// * `task_id` - Id returned by [`TaskClient::submit_task`]
    pub async fn query_status(
        &self,
        status_endpoint_name: &str,
        task_id: &str,
    ) -> Result<StatusResponse> {
        let (method, payload) = status_request(status_endpoint_name, task_id);

        let response = self
            .invoke(status_endpoint_name, method, payload)
            .await
            .map_err(|e| ClientError::QueryFailed(e.to_string()))?;

        let status = StatusResponse::parse(&response.body)?;
        debug!(
            "Task {} status: {}",
            task_id,
            status.task_status.as_deref().unwrap_or("<none>")
        );

        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedTransport, ok, test_config};

    #[test]
    fn test_extract_task_id_prefers_result() {
        let raw = r#"{"data":{"result":{"taskId":"T1"},"taskId":"T2"}}"#;
        assert_eq!(extract_task_id(raw), Some("T1".to_string()));
    }

    #[test]
    fn test_extract_task_id_fallback() {
        assert_eq!(
            extract_task_id(r#"{"data":{"taskId":"T2"}}"#),
            Some("T2".to_string())
        );
        assert_eq!(
            extract_task_id(r#"{"data":{"result":{},"taskId":12345}}"#),
            Some("12345".to_string())
        );
    }

    #[test]
    fn test_extract_task_id_missing() {
        assert_eq!(extract_task_id(""), None);
        assert_eq!(extract_task_id("not json"), None);
        assert_eq!(extract_task_id(r#"{"code":500,"message":"denied"}"#), None);
        assert_eq!(extract_task_id(r#"{"data":{"result":{"taskId":""}}}"#), None);
    }

    #[test]
    fn test_submission_body_wrapping() {
        let params = json!([{ "imageUrl": "https://example.com/a.png" }]);

        let body = submission_body(EndpointKind::ImageTranslation, &params).unwrap();
        let value: JsonValue = serde_json::from_str(&body).unwrap();
        assert_eq!(value["paramJson"], params.to_string());

        let body = submission_body(EndpointKind::Standard, &params).unwrap();
        let value: JsonValue = serde_json::from_str(&body).unwrap();
        assert_eq!(value["requestParams"], params.to_string());
        assert!(value.get("paramJson").is_none());
    }

    #[test]
    fn test_status_request_variants() {
        let (method, payload) = status_request("/ai/image/translation_mllm/results", "T1");
        assert_eq!(method, HttpMethod::Get);
        assert_eq!(
            payload,
            Payload::Query(vec![("taskId".to_string(), "T1".to_string())])
        );

        let (method, payload) = status_request("/ai/virtual/tryon/query", "T1");
        assert_eq!(method, HttpMethod::Post);
        assert_eq!(payload, Payload::Json(r#"{"task_id":"T1"}"#.to_string()));

        let (method, _) = status_request("/ai/virtual/tryon/results", "T1");
        assert_eq!(method, HttpMethod::Get);
    }

    #[test]
    fn test_status_response_parse() {
        let status = StatusResponse::parse(r#"{"data":{"taskStatus":"finished","value":42}}"#)
            .unwrap();
        assert!(status.is_terminal());
        assert_eq!(status.body["data"]["value"], 42);

        let status = StatusResponse::parse(r#"{"data":{"taskStatus":"running"}}"#).unwrap();
        assert!(!status.is_terminal());

        let status = StatusResponse::parse(r#"{"data":{}}"#).unwrap();
        assert_eq!(status.task_status, None);
        assert!(!status.is_terminal());

        assert!(matches!(
            StatusResponse::parse("<html>"),
            Err(ClientError::QueryFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_task_success() {
        let transport = ScriptedTransport::always(ok(r#"{"data":{"result":{"taskId":"T1"}}}"#));
        let client = TaskClient::with_transport(test_config(), transport.clone()).unwrap();

        let handle = client
            .submit_task("/ai/image/translation_mllm/batch", &json!([{ "a": 1 }]))
            .await
            .unwrap();

        assert_eq!(handle.task_id, "T1");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert!(
            requests[0]
                .url
                .starts_with("https://api.example.com/rest/ai/image/translation_mllm/batch?")
        );
        match &requests[0].payload {
            Payload::Json(body) => assert!(body.contains("paramJson")),
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_task_empty_body_fails() {
        let transport = ScriptedTransport::always(ok(""));
        let client = TaskClient::with_transport(test_config(), transport).unwrap();

        let err = client
            .submit_task("/ai/text/translation/batch", &json!({ "text": "hi" }))
            .await
            .unwrap_err();

        assert!(err.is_submission_failure());
    }

    #[tokio::test]
    async fn test_submit_task_transport_error_fails() {
        let transport = ScriptedTransport::always(Err("connection refused"));
        let client = TaskClient::with_transport(test_config(), transport).unwrap();

        let err = client
            .submit_task("/ai/text/translation/batch", &json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::SubmissionFailed(msg) if msg.contains("connection refused")));
    }

    #[tokio::test]
    async fn test_submit_task_after_limiter_closed() {
        let transport = ScriptedTransport::always(ok(r#"{"data":{"taskId":"T1"}}"#));
        let client = TaskClient::with_transport(test_config(), transport.clone()).unwrap();
        client.limiter().close();

        let err = client
            .submit_task("/ai/text/translation/batch", &json!({}))
            .await
            .unwrap_err();

        assert!(err.is_submission_failure());
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_query_status_error_mapping() {
        let transport = ScriptedTransport::sequence(vec![Err("timeout"), ok("not json")]);
        let client = TaskClient::with_transport(test_config(), transport).unwrap();

        let first = client.query_status("/ai/x/results", "T1").await;
        assert!(matches!(first, Err(ClientError::QueryFailed(_))));

        let second = client.query_status("/ai/x/results", "T1").await;
        assert!(matches!(second, Err(ClientError::QueryFailed(_))));
    }
}
