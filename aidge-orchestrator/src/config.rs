//! Server configuration
//!
//! Expected environment variables, on top of the API credentials read by
//! [`ApiConfig`]:
//! - PORT (optional, default: 8000)
//! - AIDGE_MAX_CONCURRENT (optional, default: 10)
//! - AIDGE_REQUEST_TIMEOUT (optional, seconds, default: 60)
//! - AIDGE_POLL_MAX_RETRIES (optional, default: 60)
//! - AIDGE_POLL_INITIAL_DELAY_MS (optional, default: 1000)
//! - AIDGE_POLL_MAX_DELAY_MS (optional, default: 10000)

use aidge_client::{ApiConfig, ConfigError, DEFAULT_MAX_CONCURRENT, PollPolicy};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Orchestrator server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// Remote API credentials
    pub api: ApiConfig,

    /// Size of the shared concurrency limiter
    pub max_concurrent: usize,

    /// Timeout of a single remote call
    pub request_timeout: Duration,

    /// Poll loop limits
    pub poll_policy: PollPolicy,
}

impl ServerConfig {
    /// Creates a configuration with defaults around the given credentials
    pub fn new(api: ApiConfig) -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{}", DEFAULT_PORT),
            api,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            poll_policy: PollPolicy::default(),
        }
    }

    /// Creates configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api = ApiConfig::from_lookup(&lookup)?;
        let defaults = Self::new(api);

        let port = parse_var(&lookup, "PORT")?.unwrap_or(DEFAULT_PORT);

        let max_concurrent =
            parse_var(&lookup, "AIDGE_MAX_CONCURRENT")?.unwrap_or(defaults.max_concurrent);

        let request_timeout = parse_var(&lookup, "AIDGE_REQUEST_TIMEOUT")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let poll_policy = PollPolicy {
            max_retries: parse_var(&lookup, "AIDGE_POLL_MAX_RETRIES")?
                .unwrap_or(defaults.poll_policy.max_retries),
            initial_delay: parse_var(&lookup, "AIDGE_POLL_INITIAL_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_policy.initial_delay),
            max_delay: parse_var(&lookup, "AIDGE_POLL_MAX_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_policy.max_delay),
        };

        let config = Self {
            bind_addr: format!("0.0.0.0:{}", port),
            max_concurrent,
            request_timeout,
            poll_policy,
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.validate()?;

        if self.max_concurrent == 0 {
            return Err(invalid("AIDGE_MAX_CONCURRENT", "must be greater than 0"));
        }

        if self.request_timeout.is_zero() {
            return Err(invalid("AIDGE_REQUEST_TIMEOUT", "must be greater than 0"));
        }

        if self.poll_policy.max_retries == 0 {
            return Err(invalid("AIDGE_POLL_MAX_RETRIES", "must be greater than 0"));
        }

        if self.poll_policy.max_delay < self.poll_policy.initial_delay {
            return Err(invalid(
                "AIDGE_POLL_MAX_DELAY_MS",
                "must not be smaller than the initial delay",
            ));
        }

        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key.to_string(), raw)),
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue(key.to_string(), reason.to_string())
}
