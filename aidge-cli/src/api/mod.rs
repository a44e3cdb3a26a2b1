//! API client module
//!
//! HTTP client for the orchestrator's batch endpoints.

use aidge_core::domain::batch::BatchRecord;
use aidge_core::dto::batch::{BatchAccepted, BatchRequest};
use anyhow::{Context, Result};
use reqwest::Client;

/// HTTP client for the Aidge orchestrator API
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the orchestrator API
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Submit a batch for background processing
    ///
    /// # Returns
    /// The id the batch was registered under
    pub async fn submit_batch(&self, req: &BatchRequest) -> Result<BatchAccepted> {
        let url = format!("{}/api/batch", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(req)
            .send()
            .await
            .context("Failed to send submit batch request")?;

        self.handle_response(response).await
    }

    /// Get a batch record by id
    pub async fn get_batch(&self, batch_id: &str) -> Result<BatchRecord> {
        let url = format!("{}/api/batch/{}", self.base_url, batch_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send get batch request")?;

        self.handle_response(response).await
    }

    /// Handle API response and deserialize JSON
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Request failed with status {}: {}", status, error_text);
        }

        response
            .json()
            .await
            .context("Failed to parse response JSON")
    }
}
