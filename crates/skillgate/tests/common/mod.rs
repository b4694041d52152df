//! Shared fixtures for skillgate integration tests.
//!
//! One RSA signing key is generated per test binary; certificates are minted
//! with rcgen around that key so validity windows and names can be chosen
//! per test.

#![allow(dead_code)]

use std::sync::OnceLock;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, TimeDelta, Utc};
use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};
use rsa::pkcs1v15::Pkcs1v15Sign;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use sha1::{Digest, Sha1};

pub const CERT_URL: &str = "https://s3.amazonaws.com/echo.api/echo-api-cert-7.pem";
pub const APP_ID: &str = "amzn1.ask.skill.0f3a6c1e-demo";
pub const SERVICE_NAME: &str = "echo-api.amazon.com";

pub fn signing_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("generate rsa key")
    })
}

fn rcgen_key_pair() -> KeyPair {
    let pem = signing_key()
        .to_pkcs8_pem(LineEnding::LF)
        .expect("encode pkcs8");
    KeyPair::from_pem(&pem).expect("import rsa key into rcgen")
}

/// Fixed "now" for every time-dependent check.
pub fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-10-18T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn offset_datetime(t: DateTime<Utc>) -> time::OffsetDateTime {
    time::OffsetDateTime::from_unix_timestamp(t.timestamp()).expect("timestamp in range")
}

/// Certificate description for [`cert_pem`].
pub struct CertTemplate<'a> {
    pub common_name: &'a str,
    pub dns_names: &'a [&'a str],
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
}

impl Default for CertTemplate<'_> {
    fn default() -> Self {
        Self {
            common_name: SERVICE_NAME,
            dns_names: &[SERVICE_NAME],
            not_before: now() - TimeDelta::days(30),
            not_after: now() + TimeDelta::days(30),
        }
    }
}

fn build_cert(template: &CertTemplate<'_>, key_pair: &KeyPair) -> String {
    let names = template.dns_names.iter().map(|n| n.to_string()).collect::<Vec<_>>();
    let mut params = CertificateParams::new(names).expect("cert params");
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, template.common_name);
    params.distinguished_name = dn;
    params.not_before = offset_datetime(template.not_before);
    params.not_after = offset_datetime(template.not_after);
    params.self_signed(key_pair).expect("self-sign").pem()
}

/// PEM certificate carrying the shared RSA signing key.
pub fn cert_pem(template: &CertTemplate<'_>) -> String {
    build_cert(template, &rcgen_key_pair())
}

/// The certificate the platform would serve today.
pub fn echo_cert_pem() -> String {
    cert_pem(&CertTemplate::default())
}

/// Otherwise valid certificate whose key is ECDSA P-256.
pub fn ec_cert_pem() -> String {
    let key_pair = KeyPair::generate().expect("generate ec key");
    build_cert(&CertTemplate::default(), &key_pair)
}

/// Base64 PKCS#1 v1.5 SHA-1 signature over `body` with the shared key.
pub fn sign(body: &[u8]) -> String {
    let digest = Sha1::digest(body);
    let signature = signing_key()
        .sign(Pkcs1v15Sign::new::<Sha1>(), &digest)
        .expect("sign body");
    BASE64.encode(signature)
}

/// A request envelope body as the platform would send it.
pub fn envelope_json(request_type: &str, app_id: &str, sent: DateTime<Utc>) -> String {
    serde_json::json!({
        "version": "1.0",
        "session": {
            "new": true,
            "sessionId": "amzn1.echo-api.session.demo",
            "application": { "applicationId": app_id },
            "attributes": { "turns": 1 },
            "user": { "userId": "amzn1.ask.account.demo" }
        },
        "request": {
            "type": request_type,
            "requestId": "amzn1.echo-api.request.demo",
            "timestamp": sent.to_rfc3339(),
            "locale": "en-US",
            "intent": { "name": "AMAZON.StopIntent" }
        }
    })
    .to_string()
}
