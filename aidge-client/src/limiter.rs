//! Concurrency limiter
//!
//! Caps the number of remote calls in flight across every task that shares a
//! client session. A permit is held for exactly one round trip and released
//! when dropped, on success, error or panic alike.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::{ClientError, Result};

/// Default number of concurrent remote calls per session
pub const DEFAULT_MAX_CONCURRENT: usize = 10;

/// Counting semaphore shared by all calls of one session
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// Scoped permit for one remote call
#[derive(Debug)]
pub struct LimiterPermit {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyLimiter {
    /// Creates a limiter; a capacity of zero is raised to one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits for a free slot
    pub async fn acquire(&self) -> Result<LimiterPermit> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ClientError::LimiterClosed)?;

        Ok(LimiterPermit { _permit: permit })
    }

    /// Stop handing out permits; waiting and future calls fail with
    /// [`ClientError::LimiterClosed`]. Calls already holding a permit finish.
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }

    /// Maximum number of concurrent calls
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Currently free slots
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Calls currently holding a permit
    pub fn in_flight(&self) -> usize {
        self.capacity - self.available()
    }
}

impl Default for ConcurrencyLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENT)
    }
}
