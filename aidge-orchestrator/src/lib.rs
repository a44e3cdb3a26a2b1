//! Aidge Orchestrator
//!
//! HTTP front end over the task client: single-task processing and
//! background batches with an in-memory record store.

pub mod api;
pub mod config;
pub mod repository;
pub mod service;

#[cfg(test)]
mod testing;

pub use api::create_router;
pub use config::ServerConfig;
pub use repository::{BatchStore, StoreError};
pub use service::BatchOrchestrator;
