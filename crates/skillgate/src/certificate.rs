//! Signing certificate decoding and validation.
//!
//! The certificate is trusted because of its pinned origin (see
//! [`crate::origin`]), not because of a chain to a root. This module only
//! decodes it and checks its validity window and subject names.

use chrono::{DateTime, Utc};
use rsa::pkcs8::DecodePublicKey;
use rsa::RsaPublicKey;
use tracing::{debug, warn};
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::GeneralName;
use x509_parser::pem::parse_x509_pem;

use crate::config::SIGNING_CERT_SERVICE_NAME;
use crate::error::{AuthError, AuthResult, ValidationError};

/// A parsed leaf certificate, held only for one request.
#[derive(Debug, Clone)]
pub struct SigningCertificate {
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    subject_names: Vec<String>,
    spki_der: Vec<u8>,
}

impl SigningCertificate {
    /// Decode the first PEM block in `bytes` and parse it as X.509.
    pub fn from_pem(bytes: &[u8]) -> AuthResult<Self> {
        let (_, pem) = parse_x509_pem(bytes).map_err(|e| AuthError::CertificatePem {
            message: e.to_string(),
        })?;

        let cert = pem.parse_x509().map_err(|e| AuthError::CertificateParse {
            message: e.to_string(),
        })?;

        Self::from_x509(&cert)
    }

    fn from_x509(cert: &X509Certificate<'_>) -> AuthResult<Self> {
        let validity = cert.validity();
        let not_before = to_utc(validity.not_before.timestamp())?;
        let not_after = to_utc(validity.not_after.timestamp())?;

        // Every subject attribute value plus the DNS alternative names.
        let mut subject_names: Vec<String> = cert
            .subject()
            .iter_attributes()
            .filter_map(|attr| attr.as_str().ok())
            .map(String::from)
            .collect();

        if let Ok(Some(san)) = cert.subject_alternative_name() {
            for name in &san.value.general_names {
                if let GeneralName::DNSName(dns) = name {
                    subject_names.push((*dns).to_string());
                }
            }
        }

        Ok(Self {
            not_before,
            not_after,
            subject_names,
            spki_der: cert.public_key().raw.to_vec(),
        })
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    pub fn subject_names(&self) -> &[String] {
        &self.subject_names
    }

    /// Check validity window (inclusive, second precision) then identity.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), ValidationError> {
        let now_secs = now.timestamp();
        if now_secs < self.not_before.timestamp() || now_secs > self.not_after.timestamp() {
            warn!(
                not_before = %self.not_before,
                not_after = %self.not_after,
                now = %now,
                "signing certificate outside validity window"
            );
            return Err(ValidationError::CertificateExpired);
        }

        if !self
            .subject_names
            .iter()
            .any(|name| name == SIGNING_CERT_SERVICE_NAME)
        {
            warn!(names = ?self.subject_names, "signing certificate does not name the service");
            return Err(ValidationError::CertificateInvalid {
                expected: SIGNING_CERT_SERVICE_NAME.to_string(),
            });
        }

        Ok(())
    }

    /// The certificate's RSA public key.
    ///
    /// Any other key type is a validation failure.
    pub fn public_key(&self) -> Result<RsaPublicKey, ValidationError> {
        RsaPublicKey::from_public_key_der(&self.spki_der).map_err(|e| {
            ValidationError::UnsupportedPublicKey {
                reason: e.to_string(),
            }
        })
    }
}

/// Decode, parse and validate a signing certificate at `now`.
pub fn authenticate_certificate(
    bytes: &[u8],
    now: DateTime<Utc>,
) -> AuthResult<SigningCertificate> {
    let cert = SigningCertificate::from_pem(bytes)?;
    cert.validate(now)?;
    debug!(not_after = %cert.not_after, "signing certificate accepted");
    Ok(cert)
}

fn to_utc(secs: i64) -> AuthResult<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| AuthError::CertificateParse {
        message: format!("validity timestamp out of range: {}", secs),
    })
}
