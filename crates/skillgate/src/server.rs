//! HTTP integration: the skill endpoint and the authentication middleware.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use std::time::Duration;
//! # use skillgate::{server, App, RequestVerifier};
//! # fn build(app: App) -> anyhow::Result<axum::Router> {
//! let verifier = Arc::new(RequestVerifier::over_https(Duration::from_secs(10))?);
//! let router = server::with_request_verification(server::skill_router(Arc::new(app)), verifier);
//! # Ok(router)
//! # }
//! ```

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use futures::StreamExt;
use tracing::{debug, error, warn};

use crate::app::AppHandler;
use crate::config::{CERT_URL_HEADER, SIGNATURE_HEADER};
use crate::envelope::RequestEnvelope;
use crate::error::{AuthError, SkillError};
use crate::resolver::CertificateResolver;
use crate::signature::BodyTee;
use crate::verifier::RequestVerifier;

/// Content type of every skill response.
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// Signature headers of an incoming request. Absent or non-ASCII values
/// read as empty.
#[derive(Debug, Clone, Default)]
pub struct SignatureHeaders {
    pub cert_url: String,
    pub signature: String,
}

impl SignatureHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        Self {
            cert_url: get(CERT_URL_HEADER),
            signature: get(SIGNATURE_HEADER),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Details stay in the log; the caller only learns the class.
        let body = match &self {
            Self::Validation(e) => {
                warn!(error = %e, "request rejected");
                "Unauthorized"
            }
            Self::Body { .. } => {
                warn!(error = %self, "request body unreadable");
                "Bad request"
            }
            Self::BodyTooLarge { .. } => {
                warn!(error = %self, "request body rejected");
                "Payload too large"
            }
            _ => {
                error!(error = %self, "signing certificate unavailable");
                "Bad gateway"
            }
        };
        (status, body).into_response()
    }
}

impl IntoResponse for SkillError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Self::Validation(e) => {
                warn!(error = %e, "request rejected");
                "Unauthorized"
            }
            Self::UnhandledRequestType(t) => {
                warn!(request_type = %t, "unhandled request type");
                "Unhandled request type"
            }
            Self::Handler {
                request_type,
                source,
            } => {
                error!(request_type = %request_type, error = ?source, "handler failed");
                "Internal server error"
            }
        };
        (status, body).into_response()
    }
}

/// Router serving `handler` at `POST /`.
///
/// Malformed JSON is answered with 400 before any handler runs.
pub fn skill_router<H: AppHandler + 'static>(handler: Arc<H>) -> Router {
    Router::new()
        .route("/", post(handle_skill::<H>))
        .with_state(handler)
}

async fn handle_skill<H: AppHandler + 'static>(
    State(handler): State<Arc<H>>,
    body: Bytes,
) -> Response {
    let envelope: RequestEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "malformed request envelope");
            return (StatusCode::BAD_REQUEST, "Malformed request").into_response();
        }
    };

    match handler.handle(&envelope).await {
        Ok(response) => match serde_json::to_vec(&response) {
            Ok(json) => (
                [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
                json,
            )
                .into_response(),
            Err(e) => {
                error!(error = %e, "failed to serialize response envelope");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        },
        Err(e) => e.into_response(),
    }
}

/// Put request authentication in front of every route of `router`.
///
/// The wrapped routes only ever see authenticated requests, and their body
/// is the exact byte sequence the signature was checked against. Bodies over
/// the verifier's limit are refused with 413 as soon as the limit is crossed.
pub fn with_request_verification<R>(router: Router, verifier: Arc<RequestVerifier<R>>) -> Router
where
    R: CertificateResolver + 'static,
{
    router.layer(middleware::from_fn_with_state(verifier, verify_request::<R>))
}

async fn verify_request<R: CertificateResolver + 'static>(
    State(verifier): State<Arc<RequestVerifier<R>>>,
    request: Request,
    next: Next,
) -> Response {
    match authenticate(&verifier, request).await {
        Ok(request) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

async fn authenticate<R: CertificateResolver>(
    verifier: &RequestVerifier<R>,
    request: Request,
) -> Result<Request, AuthError> {
    let limit = verifier.max_body_bytes();
    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.is_some_and(|len| len > limit as u64) {
        return Err(AuthError::BodyTooLarge { limit });
    }

    let headers = SignatureHeaders::from_headers(request.headers());
    let key = verifier.signing_key(&headers.cert_url).await?;

    let (parts, body) = request.into_parts();
    let mut tee = BodyTee::new();
    let mut stream = body.into_data_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| AuthError::Body {
            message: e.to_string(),
        })?;
        tee.update_within(&chunk, limit)?;
    }

    let verified = tee.verify(&key, &headers.signature)?;
    debug!(bytes = verified.as_bytes().len(), "request authenticated");
    Ok(Request::from_parts(parts, Body::from(verified.into_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn test_signature_headers_default_to_empty() {
        let mut headers = HeaderMap::new();
        headers.insert("signaturecertchainurl", HeaderValue::from_static("https://x"));
        let parsed = SignatureHeaders::from_headers(&headers);
        assert_eq!(parsed.cert_url, "https://x");
        assert_eq!(parsed.signature, "");
    }

    #[test]
    fn test_error_responses_hide_details() {
        let resp = AuthError::from(ValidationError::SignatureMismatch).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = AuthError::CertificateFetch {
            url: "https://s3.amazonaws.com/echo.api/x.pem".into(),
            message: "HTTP 500".into(),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let resp = SkillError::UnhandledRequestType("Display.Render".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = SkillError::from_handler("IntentRequest", anyhow::anyhow!("db down"))
            .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
