//! Data Transfer Objects for the HTTP API
//!
//! Request and response shapes exchanged between the orchestrator's HTTP
//! layer and its callers (including the CLI). Field names follow the wire
//! format callers already use (`api_name`, `params`, `query_api`).

pub mod batch;
pub mod task;
