//! Signed webhook authentication and request dispatch for voice-assistant
//! skills.
//!
//! Every request the skill platform sends carries two headers: the URL of a
//! signing certificate and a base64 RSA signature over the raw body. This
//! crate provides:
//!
//! - Certificate URL pinning to the platform's trusted origin
//! - Certificate fetch (HTTPS, optional cache) with a hard deadline
//! - Certificate validity window and identity checks
//! - Body signature verification that keeps the exact bytes checked
//! - Application binding and timestamp freshness checks
//! - Typed request/response envelopes and a request-type dispatcher
//! - axum integration: the skill endpoint and an authentication layer
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use skillgate::{server, App, DebugHandler, RequestVerifier, SkillConfig, StrictHandler};
//! # use skillgate::SessionHandler;
//!
//! # async fn example(handler: Arc<dyn SessionHandler>) -> anyhow::Result<()> {
//! let config = SkillConfig::from_env();
//! let app = App::new(config.application_id.clone(), handler);
//! let handler = Arc::new(DebugHandler::new(StrictHandler::new(app, &config)));
//!
//! let verifier = RequestVerifier::over_https(config.cert_fetch_timeout)?
//!     .with_max_body_bytes(config.max_body_bytes);
//! let verifier = Arc::new(verifier);
//! let router = server::with_request_verification(server::skill_router(handler), verifier);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, router).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `SKILLGATE_APPLICATION_ID` | Application id requests must be addressed to |
//! | `SKILLGATE_MAX_CLOCK_SKEW_SECS` | Request timestamp tolerance (default: 150) |
//! | `SKILLGATE_CERT_FETCH_TIMEOUT_SECS` | Certificate fetch deadline (default: 10) |
//! | `SKILLGATE_MAX_BODY_BYTES` | Signed request body limit (default: 262144) |

pub mod app;
pub mod builders;
pub mod certificate;
pub mod clock;
pub mod config;
pub mod debug;
pub mod envelope;
pub mod error;
pub mod freshness;
pub mod origin;
pub mod resolver;
pub mod server;
pub mod signature;
pub mod strict;
pub mod verifier;

// Re-export main types
pub use app::{App, AppHandler, AudioHandler, SessionHandler};
pub use certificate::{authenticate_certificate, SigningCertificate};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{
    SkillConfig, CERT_URL_HEADER, MAX_BODY_BYTES, SIGNATURE_HEADER, SIGNING_CERT_SERVICE_NAME,
    TRUSTED_CERT_HOST, TRUSTED_CERT_PATH_PREFIX, TRUSTED_CERT_PORT,
};
pub use debug::DebugHandler;
pub use envelope::{
    Card, Directive, OutputSpeech, Reprompt, Request, RequestEnvelope, Response,
    ResponseEnvelope, Session,
};
pub use error::{AuthError, AuthResult, SkillError, SkillResult, ValidationError};
pub use freshness::{validate_application_id, validate_timestamp};
pub use origin::verify_cert_url;
pub use resolver::{
    CachingResolver, CertificateResolver, HttpCertificateResolver, StaticCertificateResolver,
};
pub use server::{skill_router, with_request_verification, SignatureHeaders};
pub use signature::{verify_body, BodyTee, VerifiedBody};
pub use strict::StrictHandler;
pub use verifier::RequestVerifier;
