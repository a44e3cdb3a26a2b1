//! Batch domain types

use serde::{Deserialize, Serialize};

use crate::domain::task::TaskOutcome;

/// Batch lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Processing,
    Completed,
}

/// Outcome of one task, keyed by its position in the submitted batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    pub index: usize,
    pub outcome: TaskOutcome,
}

/// Outcome counts of a completed batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub timed_out: usize,
    pub failed: usize,
}

/// Aggregate record of a batch
///
/// A record is either `Processing` with no items, or `Completed` with one item
/// per submitted task sorted by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub batch_id: String,
    pub status: BatchStatus,
    pub items: Vec<BatchItem>,
}

impl BatchRecord {
    /// Creates a freshly registered record
    pub fn processing(batch_id: impl Into<String>) -> Self {
        Self {
            batch_id: batch_id.into(),
            status: BatchStatus::Processing,
            items: Vec::new(),
        }
    }

    /// Creates a completed record, sorting items by index
    pub fn completed(batch_id: impl Into<String>, mut items: Vec<BatchItem>) -> Self {
        items.sort_by_key(|item| item.index);
        Self {
            batch_id: batch_id.into(),
            status: BatchStatus::Completed,
            items,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == BatchStatus::Completed
    }

    /// Count outcomes; timeouts are counted apart from successes
    pub fn summary(&self) -> BatchSummary {
        self.items
            .iter()
            .fold(BatchSummary::default(), |mut summary, item| {
                if item.outcome.is_timed_out() {
                    summary.timed_out += 1;
                } else if item.outcome.is_success() {
                    summary.succeeded += 1;
                } else {
                    summary.failed += 1;
                }
                summary
            })
    }
}
