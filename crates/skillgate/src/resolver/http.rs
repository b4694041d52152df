//! Plain HTTPS certificate fetch. No caching, no retries.

use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;
use url::Url;

use super::CertificateResolver;
use crate::error::{AuthError, AuthResult};

const USER_AGENT_VALUE: &str = concat!("skillgate/", env!("CARGO_PKG_VERSION"));

/// Signing certificates are a few KB; anything larger is not a certificate.
const MAX_CERT_BYTES: u64 = 64 * 1024;

/// Fetches certificates with a single GET per call.
#[derive(Debug, Clone)]
pub struct HttpCertificateResolver {
    client: reqwest::Client,
}

impl HttpCertificateResolver {
    /// Create a resolver whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> AuthResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            // The validated URL is the only one we may dereference.
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AuthError::CertificateFetch {
                url: "n/a".to_string(),
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }

    /// Use an existing client (shared connection pool).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CertificateResolver for HttpCertificateResolver {
    async fn fetch(&self, url: &Url) -> AuthResult<Bytes> {
        debug!(url = %url, "fetching signing certificate");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::CertificateFetch {
                url: url.to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        if let Some(len) = response.content_length() {
            if len > MAX_CERT_BYTES {
                return Err(AuthError::CertificateFetch {
                    url: url.to_string(),
                    message: format!("certificate response too large: {} bytes", len),
                });
            }
        }

        // Chunked responses carry no length up front.
        collect_capped(response.bytes_stream(), url, MAX_CERT_BYTES).await
    }
}

/// Gather a body stream, failing as soon as it grows past `limit` bytes.
async fn collect_capped<S, E>(stream: S, url: &Url, limit: u64) -> AuthResult<Bytes>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    let mut stream = std::pin::pin!(stream);
    let mut body = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| AuthError::CertificateFetch {
            url: url.to_string(),
            message: format!("failed to read certificate body: {}", e),
        })?;
        if (body.len() + chunk.len()) as u64 > limit {
            return Err(AuthError::CertificateFetch {
                url: url.to_string(),
                message: format!("certificate response too large: over {} bytes", limit),
            });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use futures::stream;

    use super::*;

    fn url() -> Url {
        Url::parse("https://s3.amazonaws.com/echo.api/echo-api-cert.pem").unwrap()
    }

    #[tokio::test]
    async fn test_collect_stops_after_crossing_limit() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = pulled.clone();
        let chunks = stream::iter(0..1000).map(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, std::io::Error>(Bytes::from_static(&[b'A'; 1024]))
        });

        let err = collect_capped(chunks, &url(), MAX_CERT_BYTES).await.unwrap_err();
        assert!(
            matches!(
                &err,
                AuthError::CertificateFetch { message, .. } if message.contains("too large")
            ),
            "{:?}",
            err
        );
        assert_eq!(pulled.load(Ordering::SeqCst), 65);
    }

    #[tokio::test]
    async fn test_collect_joins_chunks_up_to_limit() {
        let chunks = stream::iter([
            Ok::<_, std::io::Error>(Bytes::from_static(b"-----BEGIN ")),
            Ok(Bytes::from_static(b"CERTIFICATE-----")),
        ]);
        let body = collect_capped(chunks, &url(), 27).await.unwrap();
        assert_eq!(body.as_ref(), b"-----BEGIN CERTIFICATE-----");
    }

    #[tokio::test]
    async fn test_collect_stream_error_is_fetch_error() {
        let chunks = stream::iter([
            Ok(Bytes::from_static(b"-----BEGIN")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ]);
        let err = collect_capped(chunks, &url(), MAX_CERT_BYTES).await.unwrap_err();
        assert!(matches!(err, AuthError::CertificateFetch { .. }));
    }
}
