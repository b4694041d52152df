//! Opt-in certificate cache.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use moka::sync::Cache;
use tracing::debug;
use url::Url;

use super::CertificateResolver;
use crate::error::AuthResult;

/// Caches fetched certificate bytes by URL in front of another resolver.
///
/// Only successful fetches are cached. Cached bytes still go through the
/// full certificate checks on every request.
#[derive(Clone)]
pub struct CachingResolver<R> {
    inner: R,
    cache: Cache<String, Bytes>,
}

impl<R: CertificateResolver> CachingResolver<R> {
    /// Cap entries to `max_entries`, each living at most `ttl`.
    pub fn new(inner: R, max_entries: u64, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

#[async_trait]
impl<R: CertificateResolver> CertificateResolver for CachingResolver<R> {
    async fn fetch(&self, url: &Url) -> AuthResult<Bytes> {
        if let Some(bytes) = self.cache.get(url.as_str()) {
            debug!(url = %url, "certificate cache hit");
            return Ok(bytes);
        }

        let bytes = self.inner.fetch(url).await?;
        self.cache.insert(url.to_string(), bytes.clone());
        Ok(bytes)
    }
}
