//! Request authentication: origin → fetch → certificate → signature.
//!
//! [`RequestVerifier`] is stateless per request and safe to share across
//! concurrent handlers; its only state is immutable configuration, the
//! resolver and the clock.

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use rsa::RsaPublicKey;
use tracing::{debug, warn};

use crate::certificate::authenticate_certificate;
use crate::clock::{Clock, SystemClock};
use crate::config::MAX_BODY_BYTES;
use crate::error::{AuthError, AuthResult};
use crate::origin::verify_cert_url;
use crate::resolver::{CertificateResolver, HttpCertificateResolver};
use crate::signature::{BodyTee, VerifiedBody};

/// Authenticates signed webhook requests.
pub struct RequestVerifier<R> {
    resolver: R,
    clock: Arc<dyn Clock>,
    fetch_timeout: Duration,
    max_body_bytes: usize,
}

impl RequestVerifier<HttpCertificateResolver> {
    /// Verifier that fetches certificates over HTTPS with no caching.
    pub fn over_https(fetch_timeout: Duration) -> AuthResult<Self> {
        Ok(Self::new(
            HttpCertificateResolver::new(fetch_timeout)?,
            fetch_timeout,
        ))
    }
}

impl<R: CertificateResolver> RequestVerifier<R> {
    pub fn new(resolver: R, fetch_timeout: Duration) -> Self {
        Self {
            resolver,
            clock: Arc::new(SystemClock),
            fetch_timeout,
            max_body_bytes: MAX_BODY_BYTES,
        }
    }

    /// Reject bodies longer than `limit` bytes without reading past it.
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Validate the certificate URL, fetch and check the certificate, and
    /// return its public key.
    pub async fn signing_key(&self, cert_url: &str) -> AuthResult<RsaPublicKey> {
        let url = verify_cert_url(cert_url).map_err(|e| {
            warn!(url = %cert_url, reason = %e, "rejected cert url");
            e
        })?;

        let bytes = tokio::time::timeout(self.fetch_timeout, self.resolver.fetch(&url))
            .await
            .map_err(|_| AuthError::FetchTimeout {
                url: url.to_string(),
                timeout: self.fetch_timeout,
            })??;

        let cert = authenticate_certificate(&bytes, self.clock.now())?;
        Ok(cert.public_key()?)
    }

    /// Authenticate a request whose body is a synchronous reader.
    ///
    /// `cert_url` and `signature` are the raw header values (empty when
    /// absent). On success the returned body holds the exact bytes read.
    pub async fn verify<B: Read>(
        &self,
        cert_url: &str,
        signature: &str,
        body: B,
    ) -> AuthResult<VerifiedBody> {
        let key = self.signing_key(cert_url).await?;

        let limit = self.max_body_bytes;
        let mut tee = BodyTee::new();
        tee.read_from(body.take((limit as u64).saturating_add(1)))?;
        if tee.len() > limit {
            warn!(limit, "request body over limit");
            return Err(AuthError::BodyTooLarge { limit });
        }
        let verified = tee.verify(&key, signature)?;

        debug!(bytes = verified.as_bytes().len(), "request authenticated");
        Ok(verified)
    }
}
