//! Full authentication and dispatch pipeline without HTTP.

mod common;

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeDelta;
use common::{cert_pem, echo_cert_pem, envelope_json, now, sign, CertTemplate, APP_ID, CERT_URL};
use skillgate::envelope::{Context, Request, Session};
use skillgate::{
    App, AppHandler, AuthError, FixedClock, OutputSpeech, RequestEnvelope, RequestVerifier,
    Response, SessionHandler, SkillConfig, SkillError, StaticCertificateResolver, StrictHandler,
    ValidationError,
};

struct Greeter;

#[async_trait]
impl SessionHandler for Greeter {
    async fn on_launch(
        &self,
        _: &Request,
        _: Option<&Session>,
        _: Option<&Context>,
    ) -> anyhow::Result<Response> {
        Ok(Response::speak(OutputSpeech::plain("Hello")))
    }

    async fn on_intent(
        &self,
        _: &Request,
        _: Option<&Session>,
        _: Option<&Context>,
    ) -> anyhow::Result<Response> {
        Ok(Response::speak(OutputSpeech::plain("Goodbye")).end_session())
    }

    async fn on_session_ended(
        &self,
        _: &Request,
        _: Option<&Session>,
        _: Option<&Context>,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

fn verifier(pem: String) -> RequestVerifier<StaticCertificateResolver> {
    let resolver = StaticCertificateResolver::new().with_cert(CERT_URL, pem);
    RequestVerifier::new(resolver, Duration::from_secs(5)).with_clock(FixedClock(now()))
}

fn strict_app() -> StrictHandler<App> {
    let config = SkillConfig::default().with_application_id(APP_ID);
    StrictHandler::new(App::new(APP_ID, Arc::new(Greeter)), &config).with_clock(FixedClock(now()))
}

#[tokio::test]
async fn test_signed_fresh_request_is_answered() {
    let body = envelope_json("LaunchRequest", APP_ID, now() - TimeDelta::seconds(10));
    let signature = sign(body.as_bytes());

    let verified = verifier(echo_cert_pem())
        .verify(CERT_URL, &signature, body.as_bytes())
        .await
        .unwrap();
    assert_eq!(verified.as_bytes(), body.as_bytes());

    let envelope: RequestEnvelope = serde_json::from_reader(verified.reader()).unwrap();
    let response = strict_app().handle(&envelope).await.unwrap();

    assert_eq!(response.version, "1.0");
    assert_eq!(
        response.response.output_speech,
        Some(OutputSpeech::plain("Hello"))
    );
    assert_eq!(response.session_attributes.unwrap()["turns"], 1);
}

#[tokio::test]
async fn test_signature_over_other_body_is_rejected() {
    let body = envelope_json("LaunchRequest", APP_ID, now());
    let other = envelope_json("IntentRequest", APP_ID, now());

    let err = verifier(echo_cert_pem())
        .verify(CERT_URL, &sign(other.as_bytes()), body.as_bytes())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthError::Validation(ValidationError::SignatureMismatch)
    ));
}

#[tokio::test]
async fn test_expired_certificate_is_rejected_before_body_is_read() {
    let expired = cert_pem(&CertTemplate {
        not_after: now() - TimeDelta::seconds(1),
        ..Default::default()
    });
    let body = envelope_json("LaunchRequest", APP_ID, now());

    let err = verifier(expired)
        .verify(CERT_URL, &sign(body.as_bytes()), body.as_bytes())
        .await
        .unwrap_err();
    assert_eq!(
        err.as_validation(),
        Some(&ValidationError::CertificateExpired)
    );
}

#[tokio::test]
async fn test_unregistered_certificate_url_is_fetch_error() {
    let body = envelope_json("LaunchRequest", APP_ID, now());
    let url = "https://s3.amazonaws.com/echo.api/unknown.pem";

    let err = verifier(echo_cert_pem())
        .verify(url, &sign(body.as_bytes()), body.as_bytes())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::CertificateFetch { .. }));
}

#[tokio::test]
async fn test_authentic_but_stale_request_is_not_dispatched() {
    let body = envelope_json("IntentRequest", APP_ID, now() - TimeDelta::seconds(151));
    let verified = verifier(echo_cert_pem())
        .verify(CERT_URL, &sign(body.as_bytes()), body.as_bytes())
        .await
        .unwrap();

    let envelope: RequestEnvelope = serde_json::from_slice(verified.as_bytes()).unwrap();
    let err = strict_app().handle(&envelope).await.unwrap_err();
    assert!(matches!(
        err,
        SkillError::Validation(ValidationError::StaleTimestamp { .. })
    ));
}

#[tokio::test]
async fn test_authentic_request_for_other_skill_is_not_dispatched() {
    let body = envelope_json("LaunchRequest", "amzn1.ask.skill.other", now());
    let verified = verifier(echo_cert_pem())
        .verify(CERT_URL, &sign(body.as_bytes()), body.as_bytes())
        .await
        .unwrap();

    let envelope: RequestEnvelope = serde_json::from_slice(verified.as_bytes()).unwrap();
    let err = strict_app().handle(&envelope).await.unwrap_err();
    assert!(matches!(
        err,
        SkillError::Validation(ValidationError::ApplicationIdMismatch { .. })
    ));
}

/// A body that never ends.
struct Endless;

impl Read for Endless {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        buf.fill(b' ');
        Ok(buf.len())
    }
}

#[tokio::test]
async fn test_unbounded_body_is_cut_off_at_limit() {
    let err = verifier(echo_cert_pem())
        .with_max_body_bytes(4096)
        .verify(CERT_URL, &sign(b"{}"), Endless)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::BodyTooLarge { limit: 4096 }));
}

#[tokio::test]
async fn test_body_exactly_at_limit_is_accepted() {
    let body = envelope_json("LaunchRequest", APP_ID, now());
    let verified = verifier(echo_cert_pem())
        .with_max_body_bytes(body.len())
        .verify(CERT_URL, &sign(body.as_bytes()), body.as_bytes())
        .await
        .unwrap();
    assert_eq!(verified.as_bytes(), body.as_bytes());
}
