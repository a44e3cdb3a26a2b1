//! Request signing
//!
//! Every call to the remote API carries a millisecond timestamp and a
//! signature over it: `HEX_UPPER(HMAC-SHA256(secret, secret ++ timestamp))`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;

use crate::config::ConfigError;

type HmacSha256 = Hmac<Sha256>;

/// Produces time-bound request signatures from a shared secret
#[derive(Clone)]
pub struct Signer {
    secret: String,
}

impl Signer {
    /// Creates a signer, rejecting an empty secret
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(Self { secret })
    }

    /// Signs a stringified millisecond timestamp
    pub fn sign(&self, timestamp: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(self.secret.as_bytes());
        mac.update(timestamp.as_bytes());
        hex::encode_upper(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}

/// Current time as a millisecond epoch string
pub fn current_timestamp() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}
