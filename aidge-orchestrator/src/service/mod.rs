//! Service Module
//!
//! Business logic layer for the orchestrator.
//! Services drive the task client and record results in repositories.

pub mod batch;

// Re-export for convenience
pub use batch as batch_service;
pub use batch::BatchOrchestrator;
