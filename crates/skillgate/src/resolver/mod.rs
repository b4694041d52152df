//! Certificate resolution.
//!
//! The verifier depends only on [`CertificateResolver`]; the default
//! [`HttpCertificateResolver`] performs one uncached GET per call. Caching is
//! opt-in via [`CachingResolver`], and [`StaticCertificateResolver`] serves
//! canned material without network access.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::error::{AuthError, AuthResult};

mod cache;
mod http;

pub use cache::CachingResolver;
pub use http::HttpCertificateResolver;

/// Fetches raw certificate bytes for an already-validated URL.
///
/// Cancellation is by dropping the returned future; the verifier wraps each
/// call in its fetch deadline.
#[async_trait]
pub trait CertificateResolver: Send + Sync {
    async fn fetch(&self, url: &Url) -> AuthResult<Bytes>;
}

#[async_trait]
impl<R: CertificateResolver + ?Sized> CertificateResolver for std::sync::Arc<R> {
    async fn fetch(&self, url: &Url) -> AuthResult<Bytes> {
        (**self).fetch(url).await
    }
}

/// Resolver backed by an in-memory URL → bytes map.
#[derive(Debug, Clone, Default)]
pub struct StaticCertificateResolver {
    certs: HashMap<String, Bytes>,
}

impl StaticCertificateResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `pem` for `url`.
    pub fn with_cert(mut self, url: impl Into<String>, pem: impl Into<Bytes>) -> Self {
        self.certs.insert(url.into(), pem.into());
        self
    }
}

#[async_trait]
impl CertificateResolver for StaticCertificateResolver {
    async fn fetch(&self, url: &Url) -> AuthResult<Bytes> {
        self.certs
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| AuthError::CertificateFetch {
                url: url.to_string(),
                message: "no certificate registered for url".to_string(),
            })
    }
}
