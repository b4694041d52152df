//! Certificate URL origin pinning.
//!
//! The signing certificate is trusted only because of where it is fetched
//! from, so the URL is checked before anything is dereferenced:
//! 1. scheme is `https`
//! 2. host is the trusted host, optionally with an explicit `:443`
//! 3. path starts with the trusted prefix
//!
//! The first failing rule wins. Scheme and host compare case-insensitively
//! (the URL parser lowercases them); the path compares case-sensitively after
//! dot-segment normalization.

use tracing::debug;
use url::Url;

use crate::config::{TRUSTED_CERT_HOST, TRUSTED_CERT_PATH_PREFIX, TRUSTED_CERT_PORT};
use crate::error::ValidationError;

/// Check a certificate URL against the pinned origin.
///
/// Returns the parsed URL so callers fetch exactly what was validated.
pub fn verify_cert_url(raw: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(raw).map_err(|e| ValidationError::InvalidCertUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "https" {
        return Err(ValidationError::InsecureCertUrl {
            scheme: url.scheme().to_string(),
        });
    }

    let host = url.host_str().unwrap_or_default();
    let port_ok = url.port().map_or(true, |p| p == TRUSTED_CERT_PORT);
    if host != TRUSTED_CERT_HOST || !port_ok {
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        return Err(ValidationError::UntrustedCertHost { host });
    }

    if !url.path().starts_with(TRUSTED_CERT_PATH_PREFIX) {
        return Err(ValidationError::UntrustedCertPath {
            path: url.path().to_string(),
        });
    }

    debug!(url = %url, "cert url origin accepted");
    Ok(url)
}
