//! Aidge HTTP Client
//!
//! A typed client for the Aidge asynchronous task API. Work is submitted to an
//! endpoint, the service answers with a task id, and the task's status
//! endpoint is polled until it reports a terminal state.
//!
//! The crate provides:
//! - [`TaskClient`]: authenticated submit and status-query round trips
//! - [`Poller`]: the backoff loop that drives a task to a terminal state
//! - [`ConcurrencyLimiter`]: the per-session cap on in-flight remote calls
//! - [`Signer`]: request signatures
//!
//! # Example
//!
//! ```no_run
//! use aidge_client::{ApiConfig, PollPolicy, Poller, TaskClient};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TaskClient::new(ApiConfig::from_env()?)?;
//!
//! let handle = client
//!     .submit_task(
//!         "/ai/image/translation_mllm/batch",
//!         &json!([{ "imageUrl": "https://example.com/a.png", "targetLanguage": "en" }]),
//!     )
//!     .await?;
//!
//! let poller = Poller::new(client.clone(), PollPolicy::default());
//! let outcome = poller
//!     .poll_until_terminal("/ai/image/translation_mllm/results", &handle.task_id)
//!     .await;
//! println!("{}", outcome.into_payload());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod limiter;
pub mod poller;
pub mod signer;
mod tasks;
pub mod transport;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{ApiConfig, ConfigError};
pub use error::{ClientError, Result};
pub use limiter::{ConcurrencyLimiter, DEFAULT_MAX_CONCURRENT};
pub use poller::{Backoff, PollOutcome, PollPolicy, Poller};
pub use signer::Signer;
pub use tasks::{StatusResponse, extract_task_id};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, Payload, ReqwestTransport, Transport};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::transport::DEFAULT_REQUEST_TIMEOUT;

const PARTNER_ID: &str = "aidge";
const SIGN_METHOD: &str = "sha256";
const SIGN_VERSION: &str = "v2";

/// Client session for the Aidge task API
///
/// Cloning a client shares its transport and its concurrency limiter, so all
/// clones count against the same in-flight budget. Use
/// [`TaskClient::with_max_concurrent`] to open a session with its own budget.
#[derive(Clone)]
pub struct TaskClient {
    config: Arc<ApiConfig>,
    base_url: String,
    signer: Signer,
    transport: Arc<dyn Transport>,
    limiter: ConcurrencyLimiter,
    timeout: Duration,
}

impl TaskClient {
    /// Create a client backed by reqwest with the default concurrency limit
    pub fn new(config: ApiConfig) -> Result<Self> {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    /// Create a client with a custom transport
    ///
    /// # Arguments
    /// * `config` - Credentials and API domain
    /// * `transport` - Anything that can send an [`HttpRequest`]
    pub fn with_transport(config: ApiConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let signer = Signer::new(config.access_key_secret.clone())?;

        Ok(Self {
            base_url: config.base_url(),
            config: Arc::new(config),
            signer,
            transport,
            limiter: ConcurrencyLimiter::default(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Replace this session's limiter with one of the given size
    pub fn with_limit(mut self, max_concurrent: usize) -> Self {
        self.limiter = ConcurrencyLimiter::new(max_concurrent);
        self
    }

    /// Open a new session sharing transport and credentials but with its own limiter
    pub fn with_max_concurrent(&self, max_concurrent: usize) -> Self {
        self.clone().with_limit(max_concurrent)
    }

    /// Set the per-call transport timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // =============================================================================
    // Authenticated Round Trip
    // =============================================================================

    /// Signed URL for an endpoint at the given timestamp
    fn signed_url(&self, endpoint_name: &str, timestamp: &str) -> String {
        format!(
            "{}/rest{}?partner_id={}&sign_method={}&sign_ver={}&app_key={}&timestamp={}&sign={}",
            self.base_url,
            endpoint_name,
            PARTNER_ID,
            SIGN_METHOD,
            SIGN_VERSION,
            self.config.access_key_name,
            timestamp,
            self.signer.sign(timestamp),
        )
    }

    /// Perform one authenticated call while holding a limiter permit
    ///
    /// Requests are signed only once a permit is granted.
    async fn invoke(
        &self,
        endpoint_name: &str,
        method: HttpMethod,
        payload: Payload,
    ) -> Result<HttpResponse> {
        let _permit = self.limiter.acquire().await?;

        let timestamp = signer::current_timestamp();
        let request = HttpRequest {
            method,
            url: self.signed_url(endpoint_name, &timestamp),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                (
                    "x-iop-trial".to_string(),
                    self.config.use_trial_resource.to_string(),
                ),
            ],
            payload,
            timeout: self.timeout,
        };

        debug!("{:?} {}", method, endpoint_name);
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            warn!(
                "{} answered with status {}; parsing body anyway",
                endpoint_name, response.status
            );
        }

        Ok(response)
    }
}

impl fmt::Debug for TaskClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskClient")
            .field("base_url", &self.base_url)
            .field("limiter", &self.limiter)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
