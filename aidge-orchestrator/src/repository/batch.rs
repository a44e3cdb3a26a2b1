//! Batch Repository
//!
//! In-memory store of batch records. Each record has a single writer, the
//! orchestrator task driving that batch, which registers it and later
//! completes it in one step. Readers only ever see a `Processing` record with
//! no items or a `Completed` record with all of them.

use aidge_core::domain::batch::{BatchItem, BatchRecord, BatchStatus};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;

/// Repository error type
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Batch {0} not found")]
    NotFound(String),

    #[error("Batch {0} is already registered")]
    AlreadyRegistered(String),

    #[error("Batch {0} is already completed")]
    AlreadyCompleted(String),

    #[error("Batch {0} items are not indexed 0..{1}")]
    InvalidItems(String, usize),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Process-wide batch records, injected into the orchestrator
#[derive(Debug, Clone, Default)]
pub struct BatchStore {
    records: Arc<RwLock<HashMap<String, BatchRecord>>>,
    counter: Arc<AtomicU64>,
}

impl BatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next batch id (`batch_1`, `batch_2`, ...)
    pub fn next_batch_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("batch_{}", n)
    }

    /// Register a new `Processing` record
    pub async fn register(&self, batch_id: &str) -> Result<BatchRecord> {
        let mut records = self.records.write().await;
        if records.contains_key(batch_id) {
            return Err(StoreError::AlreadyRegistered(batch_id.to_string()));
        }

        let record = BatchRecord::processing(batch_id);
        records.insert(batch_id.to_string(), record.clone());

        tracing::debug!("Registered batch {}", batch_id);
        Ok(record)
    }

    /// Move a record from `Processing` to `Completed` with all of its items
    pub async fn complete(&self, batch_id: &str, items: Vec<BatchItem>) -> Result<BatchRecord> {
        let record = BatchRecord::completed(batch_id, items);
        validate_items(batch_id, &record.items)?;

        let mut records = self.records.write().await;
        let current = records
            .get_mut(batch_id)
            .ok_or_else(|| StoreError::NotFound(batch_id.to_string()))?;

        if current.status == BatchStatus::Completed {
            return Err(StoreError::AlreadyCompleted(batch_id.to_string()));
        }

        *current = record.clone();

        tracing::debug!("Completed batch {} with {} item(s)", batch_id, record.items.len());
        Ok(record)
    }

    /// Get a snapshot of a record
    pub async fn get(&self, batch_id: &str) -> Option<BatchRecord> {
        self.records.read().await.get(batch_id).cloned()
    }

    /// Number of records held
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Sorted items must be indexed exactly `0..n`
fn validate_items(batch_id: &str, items: &[BatchItem]) -> Result<()> {
    if items.iter().enumerate().any(|(i, item)| item.index != i) {
        return Err(StoreError::InvalidItems(batch_id.to_string(), items.len()));
    }
    Ok(())
}
