//! Skill configuration and the platform's fixed trust constants.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Host that serves the platform's signing certificates.
pub const TRUSTED_CERT_HOST: &str = "s3.amazonaws.com";

/// Port allowed as an explicit suffix on [`TRUSTED_CERT_HOST`].
pub const TRUSTED_CERT_PORT: u16 = 443;

/// Path prefix every signing certificate URL must start with.
pub const TRUSTED_CERT_PATH_PREFIX: &str = "/echo.api/";

/// Name the signing certificate must carry among its subject names.
pub const SIGNING_CERT_SERVICE_NAME: &str = "echo-api.amazon.com";

/// Header carrying the certificate URL.
pub const CERT_URL_HEADER: &str = "SignatureCertChainUrl";

/// Header carrying the base64 body signature.
pub const SIGNATURE_HEADER: &str = "Signature";

/// Default cap on a signed request body.
pub const MAX_BODY_BYTES: usize = 256 * 1024;

/// Skill configuration, fixed for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillConfig {
    /// Application id requests must be addressed to.
    #[serde(default)]
    pub application_id: String,

    /// Maximum allowed difference between request timestamp and now.
    #[serde(default = "default_max_clock_skew")]
    pub max_clock_skew: Duration,

    /// Deadline for fetching the signing certificate.
    #[serde(default = "default_cert_fetch_timeout")]
    pub cert_fetch_timeout: Duration,

    /// Largest request body read before authentication gives up.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_max_clock_skew() -> Duration {
    Duration::from_secs(150)
}

fn default_cert_fetch_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_max_body_bytes() -> usize {
    MAX_BODY_BYTES
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            application_id: String::new(),
            max_clock_skew: default_max_clock_skew(),
            cert_fetch_timeout: default_cert_fetch_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl SkillConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `SKILLGATE_APPLICATION_ID` | Expected application id |
    /// | `SKILLGATE_MAX_CLOCK_SKEW_SECS` | Timestamp tolerance (default 150) |
    /// | `SKILLGATE_CERT_FETCH_TIMEOUT_SECS` | Certificate fetch deadline (default 10) |
    /// | `SKILLGATE_MAX_BODY_BYTES` | Request body limit (default 262144) |
    pub fn from_env() -> Self {
        Self {
            application_id: std::env::var("SKILLGATE_APPLICATION_ID").unwrap_or_default(),
            max_clock_skew: std::env::var("SKILLGATE_MAX_CLOCK_SKEW_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or_else(default_max_clock_skew),
            cert_fetch_timeout: std::env::var("SKILLGATE_CERT_FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or_else(default_cert_fetch_timeout),
            max_body_bytes: std::env::var("SKILLGATE_MAX_BODY_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_max_body_bytes),
        }
    }

    /// Set the expected application id.
    pub fn with_application_id(mut self, id: impl Into<String>) -> Self {
        self.application_id = id.into();
        self
    }

    /// Set the timestamp tolerance.
    pub fn with_max_clock_skew(mut self, skew: Duration) -> Self {
        self.max_clock_skew = skew;
        self
    }

    /// Set the request body limit.
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Set the certificate fetch deadline.
    pub fn with_cert_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.cert_fetch_timeout = timeout;
        self
    }
}
