//! API credentials and connection settings
//!
//! Expected environment variables:
//! - `AIDGE_API_KEY_NAME` (required): access key identifier, sent as `app_key`
//! - `AIDGE_API_KEY_SECRET` (required): access key secret used for signing
//! - `AIDGE_API_DOMAIN` (required): API host, optionally with an explicit scheme
//! - `AIDGE_USE_TRIAL_RESOURCE` (optional, default: false)

use std::fmt;
use thiserror::Error;

pub const ENV_KEY_NAME: &str = "AIDGE_API_KEY_NAME";
pub const ENV_KEY_SECRET: &str = "AIDGE_API_KEY_SECRET";
pub const ENV_API_DOMAIN: &str = "AIDGE_API_DOMAIN";
pub const ENV_USE_TRIAL: &str = "AIDGE_USE_TRIAL_RESOURCE";

/// Configuration errors, fatal at startup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Access key secret must not be empty")]
    MissingSecret,
}

/// Credentials and endpoint of the remote task API
#[derive(Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Access key identifier
    pub access_key_name: String,
    /// Access key secret
    pub access_key_secret: String,
    /// API domain, e.g. `api.example.com` or `http://127.0.0.1:9000`
    pub api_domain: String,
    /// Bill calls against trial resources
    pub use_trial_resource: bool,
}

impl ApiConfig {
    pub fn new(
        access_key_name: impl Into<String>,
        access_key_secret: impl Into<String>,
        api_domain: impl Into<String>,
    ) -> Self {
        Self {
            access_key_name: access_key_name.into(),
            access_key_secret: access_key_secret.into(),
            api_domain: api_domain.into(),
            use_trial_resource: false,
        }
    }

    pub fn with_trial_resource(mut self, use_trial_resource: bool) -> Self {
        self.use_trial_resource = use_trial_resource;
        self
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
        let required = |key: &str| {
            lookup(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        let access_key_name = required(ENV_KEY_NAME)?;
        let access_key_secret = required(ENV_KEY_SECRET)?;
        let api_domain = required(ENV_API_DOMAIN)?;

        let use_trial_resource = match lookup(ENV_USE_TRIAL) {
            None => false,
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" | "" => false,
                _ => return Err(ConfigError::InvalidValue(ENV_USE_TRIAL.to_string(), value)),
            },
        };

        let config = Self {
            access_key_name,
            access_key_secret,
            api_domain,
            use_trial_resource,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_key_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                ENV_KEY_NAME.to_string(),
                "must not be empty".to_string(),
            ));
        }

        if self.access_key_secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }

        if self.api_domain.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                ENV_API_DOMAIN.to_string(),
                "must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Base URL requests are sent to, `https://` unless the domain names a scheme
    pub fn base_url(&self) -> String {
        let domain = self.api_domain.trim().trim_end_matches('/');
        if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{}", domain)
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("access_key_name", &self.access_key_name)
            .field("access_key_secret", &"<redacted>")
            .field("api_domain", &self.api_domain)
            .field("use_trial_resource", &self.use_trial_resource)
            .finish()
    }
}
