//! Batch command handlers
//!
//! Submits batches to a running orchestrator and fetches their records.

use aidge_core::dto::batch::BatchRequest;
use anyhow::Result;
use clap::Subcommand;
use colored::*;
use std::path::PathBuf;

use super::{load_requests, print_record};
use crate::api::ApiClient;
use crate::config::Config;

/// Batch subcommands
#[derive(Subcommand)]
pub enum BatchCommands {
    /// Submit a batch file for background processing
    Submit {
        /// JSON file holding an array of task requests
        file: PathBuf,

        /// Dedicated concurrency limit for this batch
        #[arg(long)]
        max_concurrent: Option<usize>,
    },
    /// Get a batch record
    Get {
        /// Batch id, e.g. batch_1
        id: String,
    },
}

/// Handle batch commands
///
/// # Arguments
/// * `command` - The batch command to execute
/// * `config` - The CLI configuration
pub async fn handle_batch_command(command: BatchCommands, config: &Config) -> Result<()> {
    let client = ApiClient::new(&config.server_url);

    match command {
        BatchCommands::Submit {
            file,
            max_concurrent,
        } => {
            let req = BatchRequest {
                requests: load_requests(&file)?,
                max_concurrent,
            };
            let accepted = client.submit_batch(&req).await?;

            println!("{}", "✓ Batch submitted".green().bold());
            println!("  ID:      {}", accepted.batch_id.cyan());
            println!("  {}", accepted.message.dimmed());
            Ok(())
        }
        BatchCommands::Get { id } => {
            let record = client.get_batch(&id).await?;
            print_record(&record);
            Ok(())
        }
    }
}
