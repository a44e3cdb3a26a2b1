//! Batch Service
//!
//! Fans a batch of task specifications out to the task client, one tokio task
//! per specification, and records the outcomes once every task has resolved.
//! A failing task only fails its own item; siblings keep running and the batch
//! still completes.

use aidge_client::{ClientError, PollPolicy, Poller, TaskClient};
use aidge_core::domain::batch::{BatchItem, BatchRecord};
use aidge_core::domain::task::{SUBMISSION_FAILED_REASON, TaskHandle, TaskOutcome, TaskSpec};
use serde_json::Value as JsonValue;
use tokio::task::JoinHandle;

use crate::repository::{BatchStore, StoreError};

/// Runs batches and keeps their records
#[derive(Debug, Clone)]
pub struct BatchOrchestrator {
    client: TaskClient,
    policy: PollPolicy,
    store: BatchStore,
}

impl BatchOrchestrator {
    /// Create an orchestrator
    ///
    /// # Arguments
    /// * `client` - Shared session; its limiter bounds every batch run without an explicit limit
    /// * `policy` - Poll loop limits applied to every task
    /// * `store` - Where batch records are kept
    pub fn new(client: TaskClient, policy: PollPolicy, store: BatchStore) -> Self {
        Self {
            client,
            policy,
            store,
        }
    }

    pub fn client(&self) -> &TaskClient {
        &self.client
    }

    /// Run a batch to completion
    ///
    /// # Arguments
    /// * `specs` - Tasks in submission order
    /// * `max_concurrent` - Dedicated limit for this batch; the shared session when `None`
    ///
    /// # Returns
    /// The completed record, one item per spec in original order
    pub async fn run_batch(
        &self,
        specs: Vec<TaskSpec>,
        max_concurrent: Option<usize>,
    ) -> Result<BatchRecord, StoreError> {
        let batch_id = self.register_batch(specs.len()).await?;
        self.execute(&batch_id, specs, max_concurrent).await
    }

    /// Register a batch and run it in the background
    ///
    /// # Returns
    /// The batch id, immediately; the record turns `Completed` later
    pub async fn start_batch(
        &self,
        specs: Vec<TaskSpec>,
        max_concurrent: Option<usize>,
    ) -> Result<String, StoreError> {
        let batch_id = self.register_batch(specs.len()).await?;

        let orchestrator = self.clone();
        let id = batch_id.clone();
        tokio::spawn(async move {
            if let Err(e) = orchestrator.execute(&id, specs, max_concurrent).await {
                tracing::error!("Failed to record batch {}: {}", id, e);
            }
        });

        Ok(batch_id)
    }

    /// Submit one task and poll it to completion
    ///
    /// Unlike batch items, a submission failure is returned as an error.
    pub async fn process_task(&self, spec: TaskSpec) -> Result<(TaskHandle, JsonValue), ClientError> {
        let handle = self
            .client
            .submit_task(&spec.endpoint_name, &spec.parameters)
            .await?;

        let poller = Poller::new(self.client.clone(), self.policy);
        let outcome = poller
            .poll_until_terminal(&spec.status_endpoint_name, &handle.task_id)
            .await;

        Ok((handle, outcome.into_payload()))
    }

    /// Get a batch record
    pub async fn batch(&self, batch_id: &str) -> Option<BatchRecord> {
        self.store.get(batch_id).await
    }

    async fn register_batch(&self, size: usize) -> Result<String, StoreError> {
        let batch_id = self.store.next_batch_id();
        self.store.register(&batch_id).await?;

        tracing::info!(
            "Created batch {} with {} task(s) ({} batch(es) recorded)",
            batch_id,
            size,
            self.store.len().await
        );
        Ok(batch_id)
    }

    /// Session used for one batch
    fn session(&self, max_concurrent: Option<usize>) -> TaskClient {
        match max_concurrent {
            Some(limit) => self.client.with_max_concurrent(limit),
            None => self.client.clone(),
        }
    }

    async fn execute(
        &self,
        batch_id: &str,
        specs: Vec<TaskSpec>,
        max_concurrent: Option<usize>,
    ) -> Result<BatchRecord, StoreError> {
        let session = self.session(max_concurrent);
        tracing::info!(
            "Processing batch {} (concurrency: {})",
            batch_id,
            session.limiter().capacity()
        );

        let poller = Poller::new(session, self.policy);

        let handles: Vec<(usize, JoinHandle<TaskOutcome>)> = specs
            .into_iter()
            .enumerate()
            .map(|(index, spec)| {
                let poller = poller.clone();
                tracing::debug!(
                    "Spawning task {} of {}: {} ({:?} -> {:?})",
                    index,
                    batch_id,
                    spec.endpoint_name,
                    spec.submit_kind(),
                    spec.status_kind()
                );
                (index, tokio::spawn(async move { run_task(&poller, &spec).await }))
            })
            .collect();

        let mut items = Vec::with_capacity(handles.len());
        for (index, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Task {} of {} panicked: {}", index, batch_id, e);
                    TaskOutcome::failure(format!("task aborted: {}", e))
                }
            };
            items.push(BatchItem { index, outcome });
        }

        let record = self.store.complete(batch_id, items).await?;

        let summary = record.summary();
        tracing::info!(
            "Batch {} completed: {} succeeded, {} timed out, {} failed",
            batch_id,
            summary.succeeded,
            summary.timed_out,
            summary.failed
        );

        Ok(record)
    }
}

/// Drive one spec to an outcome: submit, then poll
///
/// Never fails; every error becomes a `Failure` outcome.
pub async fn run_task(poller: &Poller, spec: &TaskSpec) -> TaskOutcome {
    let handle = match poller
        .client()
        .submit_task(&spec.endpoint_name, &spec.parameters)
        .await
    {
        Ok(handle) => handle,
        Err(e) => {
            tracing::warn!("Submission to {} failed: {}", spec.endpoint_name, e);
            return TaskOutcome::failure(SUBMISSION_FAILED_REASON);
        }
    };

    let outcome = poller
        .poll_until_terminal(&spec.status_endpoint_name, &handle.task_id)
        .await;

    TaskOutcome::success(handle.task_id, outcome.into_payload())
}
