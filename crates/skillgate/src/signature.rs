//! Body signature verification.
//!
//! The body is read exactly once. Every chunk is fed to a SHA-1 accumulator
//! and retained, so after verification the identical bytes can be handed to
//! the next consumer. On failure the retained bytes are dropped and nothing
//! downstream ever sees them.

use std::io::{self, Read, Write};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bytes::Bytes;
use rsa::pkcs1v15::Pkcs1v15Sign;
use rsa::RsaPublicKey;
use sha1::{Digest, Sha1};
use tracing::{debug, warn};

use crate::error::{AuthError, AuthResult, ValidationError};

/// Read-once fan-out of body bytes into a digest and a retained buffer.
#[derive(Debug, Clone, Default)]
pub struct BodyTee {
    hasher: Sha1,
    buffer: Vec<u8>,
}

impl BodyTee {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of the body.
    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
        self.buffer.extend_from_slice(chunk);
    }

    /// Feed one chunk unless it would take the body past `limit` bytes.
    ///
    /// Nothing of an oversized chunk is kept.
    pub fn update_within(&mut self, chunk: &[u8], limit: usize) -> AuthResult<()> {
        if self.buffer.len().saturating_add(chunk.len()) > limit {
            warn!(limit, "request body over limit");
            return Err(AuthError::BodyTooLarge { limit });
        }
        self.update(chunk);
        Ok(())
    }

    /// Drain a synchronous reader into the tee.
    pub fn read_from<R: Read>(&mut self, mut body: R) -> AuthResult<u64> {
        io::copy(&mut body, self).map_err(|e| AuthError::Body {
            message: e.to_string(),
        })
    }

    /// Number of body bytes seen so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Finish the digest and verify `signature` over it with `key`.
    ///
    /// `signature` is the raw header value; undecodable base64 is reported as
    /// a signature mismatch.
    pub fn verify(
        self,
        key: &RsaPublicKey,
        signature: &str,
    ) -> Result<VerifiedBody, ValidationError> {
        let digest = self.hasher.finalize();

        let Ok(signature_bytes) = BASE64.decode(signature.trim()) else {
            warn!("signature header is not valid base64");
            return Err(ValidationError::SignatureMismatch);
        };

        if key
            .verify(Pkcs1v15Sign::new::<Sha1>(), &digest, &signature_bytes)
            .is_err()
        {
            warn!(digest = %hex::encode(digest), "body signature did not verify");
            return Err(ValidationError::SignatureMismatch);
        }

        debug!(bytes = self.buffer.len(), "body signature verified");
        Ok(VerifiedBody {
            bytes: Bytes::from(self.buffer),
        })
    }
}

impl Write for BodyTee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Verify a synchronous body stream and return a re-readable copy.
pub fn verify_body<R: Read>(
    key: &RsaPublicKey,
    body: R,
    signature: &str,
) -> AuthResult<VerifiedBody> {
    let mut tee = BodyTee::new();
    tee.read_from(body)?;
    Ok(tee.verify(key, signature)?)
}

/// The exact bytes whose signature verified.
///
/// Cloning is cheap; every reader starts at the first byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedBody {
    bytes: Bytes,
}

impl VerifiedBody {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// A fresh independent reader over the body.
    pub fn reader(&self) -> io::Cursor<Bytes> {
        io::Cursor::new(self.bytes.clone())
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tee_digest_matches_one_shot_digest() {
        let body = b"{\"version\":\"1.0\",\"request\":{\"type\":\"LaunchRequest\"}}";

        let mut chunked = BodyTee::new();
        for chunk in body.chunks(7) {
            chunked.update(chunk);
        }
        let mut whole = BodyTee::new();
        whole.read_from(&body[..]).unwrap();

        assert_eq!(chunked.len(), body.len());
        assert_eq!(chunked.buffer, whole.buffer);
        assert_eq!(chunked.hasher.finalize(), Sha1::digest(body));
    }

    #[test]
    fn test_read_error_is_body_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            }
        }

        let err = BodyTee::new().read_from(Broken).unwrap_err();
        assert!(matches!(err, AuthError::Body { .. }));
    }

    #[test]
    fn test_verified_body_readers_are_independent() {
        let body = VerifiedBody {
            bytes: Bytes::from_static(b"hello world"),
        };

        let mut first = String::new();
        body.reader().read_to_string(&mut first).unwrap();
        let mut second = String::new();
        body.reader().read_to_string(&mut second).unwrap();

        assert_eq!(first, "hello world");
        assert_eq!(second, "hello world");
        assert_eq!(body.as_bytes(), b"hello world");
    }

    #[test]
    fn test_update_within_limit() {
        let mut tee = BodyTee::new();
        tee.update_within(&[b'a'; 600], 1024).unwrap();
        tee.update_within(&[b'b'; 424], 1024).unwrap();
        assert_eq!(tee.len(), 1024);

        let err = tee.update_within(b"c", 1024).unwrap_err();
        assert!(matches!(err, AuthError::BodyTooLarge { limit: 1024 }));
        assert_eq!(tee.len(), 1024);
    }
}
