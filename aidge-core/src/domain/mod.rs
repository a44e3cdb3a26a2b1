//! Core domain types
//!
//! These types describe units of work sent to the remote task API and the
//! aggregate records the orchestrator builds from them. They are shared
//! between the client (which produces outcomes) and the orchestrator (which
//! stores them).

pub mod batch;
pub mod endpoint;
pub mod task;
