//! Local run command
//!
//! Runs a batch file in-process, talking to the remote API directly.

use aidge_client::{ApiConfig, DEFAULT_MAX_CONCURRENT, PollPolicy, TaskClient};
use aidge_core::domain::task::TaskSpec;
use aidge_orchestrator::{BatchOrchestrator, BatchStore};
use anyhow::{Context, Result};
use colored::*;
use std::path::Path;

use super::{load_requests, print_record};

/// Run every request in `file` and print the outcomes
pub async fn run_batch_file(file: &Path, max_concurrent: Option<usize>) -> Result<()> {
    let requests = load_requests(file)?;
    let limit = max_concurrent.unwrap_or(DEFAULT_MAX_CONCURRENT);
    if limit == 0 {
        anyhow::bail!("--max-concurrent must be greater than 0");
    }

    let api = ApiConfig::from_env().context("Missing API credentials")?;
    let client = TaskClient::new(api)
        .context("Failed to create task client")?
        .with_limit(limit);

    println!(
        "{}",
        format!("Running {} task(s), at most {} at a time...", requests.len(), limit).bold()
    );
    println!();

    let orchestrator = BatchOrchestrator::new(client, PollPolicy::default(), BatchStore::new());
    let specs: Vec<TaskSpec> = requests.into_iter().map(TaskSpec::from).collect();
    let record = orchestrator.run_batch(specs, None).await?;

    print_record(&record);

    Ok(())
}
