//! Endpoint classification
//!
//! The remote API has a few endpoint families that differ in how request
//! bodies are wrapped and how status queries are sent. Classification happens
//! once per endpoint name so the wire quirks stay out of the submit/poll logic.

use serde::{Deserialize, Serialize};

const IMAGE_TRANSLATION_PREFIX: &str = "/ai/image/translation";
const VIRTUAL_SEGMENT: &str = "/ai/virtual/";
const RESULTS_SUFFIX: &str = "/results";

/// Endpoint family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
    /// Parameters wrapped under `requestParams`, status queried by `taskId` query parameter
    Standard,
    /// Parameters wrapped under `paramJson`
    ImageTranslation,
    /// Status queried with a `{"task_id": ..}` JSON body
    Virtual,
}

impl EndpointKind {
    /// Classifies an endpoint name such as `/ai/image/translation_mllm/batch`
    pub fn classify(endpoint_name: &str) -> Self {
        if endpoint_name.starts_with(IMAGE_TRANSLATION_PREFIX) {
            EndpointKind::ImageTranslation
        } else if endpoint_name.contains(VIRTUAL_SEGMENT) {
            EndpointKind::Virtual
        } else {
            EndpointKind::Standard
        }
    }

    /// Key the JSON-encoded parameters are wrapped under on submission
    pub fn submit_param_key(self) -> &'static str {
        match self {
            EndpointKind::ImageTranslation => "paramJson",
            EndpointKind::Standard | EndpointKind::Virtual => "requestParams",
        }
    }

    /// Whether status queries carry the task id as a JSON body
    pub fn queries_with_json_body(self) -> bool {
        matches!(self, EndpointKind::Virtual)
    }
}

/// Whether a status endpoint is read with GET rather than POST
pub fn is_results_endpoint(endpoint_name: &str) -> bool {
    endpoint_name.ends_with(RESULTS_SUFFIX)
}
