//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod batch;
mod run;

pub use batch::BatchCommands;

use aidge_core::domain::batch::BatchRecord;
use aidge_core::domain::task::TaskOutcome;
use aidge_core::dto::task::TaskRequest;
use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run a batch file locally with credentials from the environment
    Run {
        /// JSON file holding an array of task requests
        file: PathBuf,

        /// Maximum number of remote calls in flight
        #[arg(long)]
        max_concurrent: Option<usize>,
    },
    /// Batch management on a running orchestrator
    Batch {
        #[command(subcommand)]
        command: BatchCommands,
    },
}

/// Handle a CLI command
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Run {
            file,
            max_concurrent,
        } => run::run_batch_file(&file, max_concurrent).await,
        Commands::Batch { command } => batch::handle_batch_command(command, config).await,
    }
}

/// Read a JSON array of task requests from disk
fn load_requests(path: &Path) -> Result<Vec<TaskRequest>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_requests(&content).with_context(|| format!("Invalid batch file {}", path.display()))
}

fn parse_requests(content: &str) -> Result<Vec<TaskRequest>> {
    let requests: Vec<TaskRequest> = serde_json::from_str(content)?;
    if requests.is_empty() {
        anyhow::bail!("batch file contains no requests");
    }
    Ok(requests)
}

fn print_record(record: &BatchRecord) {
    let summary = record.summary();

    println!("{}", "Batch Details:".bold());
    println!("  ID:        {}", record.batch_id.cyan());
    println!("  Status:    {}", format!("{:?}", record.status).to_lowercase());
    if record.is_completed() {
        println!(
            "  Items:     {} ({} succeeded, {} timed out, {} failed)",
            record.items.len(),
            summary.succeeded.to_string().green(),
            summary.timed_out.to_string().yellow(),
            summary.failed.to_string().red()
        );
    }

    for item in &record.items {
        match &item.outcome {
            TaskOutcome::Success { task_id, .. } if item.outcome.is_timed_out() => {
                println!(
                    "\n  {} {} task {} timed out",
                    format!("[{}]", item.index).dimmed(),
                    "⏱".yellow(),
                    task_id.cyan()
                );
            }
            TaskOutcome::Success {
                task_id,
                raw_result,
            } => {
                println!(
                    "\n  {} {} task {}",
                    format!("[{}]", item.index).dimmed(),
                    "✓".green(),
                    task_id.cyan()
                );
                let pretty = serde_json::to_string_pretty(raw_result)
                    .unwrap_or_else(|_| raw_result.to_string());
                for line in pretty.lines() {
                    println!("      {}", line);
                }
            }
            TaskOutcome::Failure { reason } => {
                println!(
                    "\n  {} {} {}",
                    format!("[{}]", item.index).dimmed(),
                    "✗".red(),
                    reason.red()
                );
            }
        }
    }
}
