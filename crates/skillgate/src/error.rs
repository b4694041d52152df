//! Error types for request authentication and dispatch.
//!
//! Two families never mix: [`ValidationError`] means the request was
//! well-formed but failed an authenticity, freshness or binding check, while
//! the remaining [`AuthError`] variants are transport or parse failures.

use std::time::Duration;

use axum::http::StatusCode;

/// A request failed an authenticity, freshness or binding check.
///
/// Always terminal for the single request; never a server fault.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Certificate URL could not be parsed at all.
    #[error("invalid cert url '{url}': {reason}")]
    InvalidCertUrl { url: String, reason: String },

    /// Certificate URL does not use https.
    #[error("cert url not https: {scheme}")]
    InsecureCertUrl { scheme: String },

    /// Certificate URL points somewhere other than the trusted host.
    #[error("cert not on trusted host: {host}")]
    UntrustedCertHost { host: String },

    /// Certificate URL path is outside the trusted prefix.
    #[error("not an echo cert: {path}")]
    UntrustedCertPath { path: String },

    /// Current time falls outside the certificate's validity window.
    ///
    /// Covers both not-yet-valid and expired certificates.
    #[error("certificate expired")]
    CertificateExpired,

    /// Certificate does not name the platform service.
    #[error("certification invalid: {expected} not in subject names")]
    CertificateInvalid { expected: String },

    /// Certificate key is not an RSA key.
    #[error("unsupported certificate public key: {reason}")]
    UnsupportedPublicKey { reason: String },

    /// Signature does not verify over the request body.
    #[error("signature match failed")]
    SignatureMismatch,

    /// Envelope carries no application id.
    #[error("request applicationID missing")]
    ApplicationIdMissing,

    /// Envelope is addressed to a different application.
    #[error("request applicationID mismatch: {actual}")]
    ApplicationIdMismatch { actual: String },

    /// Request timestamp is not a valid RFC 3339 date-time.
    #[error("invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    /// Request timestamp is outside the allowed clock skew.
    #[error(
        "timestamp {timestamp} difference of {:.3}s exceeds {max_secs}s",
        millis_as_secs(.skew_ms)
    )]
    StaleTimestamp {
        timestamp: String,
        /// Signed `now - timestamp`, in milliseconds.
        skew_ms: i64,
        max_secs: u64,
    },
}

/// Errors from the authentication pipeline.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request was rejected as inauthentic.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Certificate could not be fetched.
    #[error("failed to read cert at {url}: {message}")]
    CertificateFetch { url: String, message: String },

    /// Certificate fetch exceeded the configured deadline.
    #[error("cert fetch from {url} timed out after {timeout:?}")]
    FetchTimeout { url: String, timeout: Duration },

    /// Certificate bytes did not contain a PEM block.
    #[error("failed to parse certificate PEM: {message}")]
    CertificatePem { message: String },

    /// PEM block did not hold a well-formed X.509 certificate.
    #[error("failed to parse certificate: {message}")]
    CertificateParse { message: String },

    /// Request body could not be read.
    #[error("failed to read request body: {message}")]
    Body { message: String },

    /// Request body exceeded the configured limit.
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
}

impl AuthError {
    /// Whether this is a deliberate authenticity rejection.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The validation failure, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(v) => Some(v),
            _ => None,
        }
    }

    /// HTTP status for this error at the webhook boundary.
    ///
    /// - Validation: 401 Unauthorized
    /// - Body read: 400 Bad Request
    /// - Body over the limit: 413 Payload Too Large
    /// - Certificate fetch, timeout and parse: 502 Bad Gateway
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNAUTHORIZED,
            Self::Body { .. } => StatusCode::BAD_REQUEST,
            Self::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::CertificateFetch { .. }
            | Self::FetchTimeout { .. }
            | Self::CertificatePem { .. }
            | Self::CertificateParse { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        Self::CertificateFetch {
            url: err
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            message: err.to_string(),
        }
    }
}

/// Errors from dispatching a request envelope to application handlers.
#[derive(Debug, thiserror::Error)]
pub enum SkillError {
    /// The envelope failed a freshness or binding check.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No handler is registered for the request type.
    #[error("unhandled request type: {0}")]
    UnhandledRequestType(String),

    /// An application handler failed.
    #[error("failed to handle {request_type} request: {source}")]
    Handler {
        request_type: String,
        #[source]
        source: anyhow::Error,
    },
}

impl SkillError {
    /// Wrap a handler error, keeping validation failures in their own class.
    pub fn from_handler(request_type: &str, err: anyhow::Error) -> Self {
        match err.downcast::<ValidationError>() {
            Ok(v) => Self::Validation(v),
            Err(source) => Self::Handler {
                request_type: request_type.to_string(),
                source,
            },
        }
    }

    /// HTTP status for this error at the webhook boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNAUTHORIZED,
            Self::UnhandledRequestType(_) => StatusCode::BAD_REQUEST,
            Self::Handler { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn millis_as_secs(ms: &i64) -> f64 {
    *ms as f64 / 1000.0
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Result type for dispatch operations.
pub type SkillResult<T> = Result<T, SkillError>;
