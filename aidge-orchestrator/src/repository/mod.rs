//! Repository Module
//!
//! State owned by the orchestrator. Batch records live in memory only and do
//! not survive a restart.

pub mod batch;

// Re-export for convenience
pub use batch as batch_repository;
pub use batch::{BatchStore, StoreError};
