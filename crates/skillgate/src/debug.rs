//! Request/response logging around a dispatcher.

use async_trait::async_trait;
use tracing::{debug, enabled, Level};

use crate::app::AppHandler;
use crate::envelope::{RequestEnvelope, ResponseEnvelope};
use crate::error::SkillResult;

/// Logs every envelope in and out at debug level.
///
/// Serialization only happens when debug logging is enabled.
pub struct DebugHandler<H> {
    inner: H,
}

impl<H: AppHandler> DebugHandler<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

fn request_id(envelope: &RequestEnvelope) -> &str {
    match envelope.request.request_id.as_str() {
        "" => "n/a",
        id => id,
    }
}

#[async_trait]
impl<H: AppHandler> AppHandler for DebugHandler<H> {
    async fn handle(&self, envelope: &RequestEnvelope) -> SkillResult<ResponseEnvelope> {
        let request_id = request_id(envelope);
        if enabled!(Level::DEBUG) {
            match serde_json::to_string(envelope) {
                Ok(json) => debug!(request_id = %request_id, request = %json, "skill request"),
                Err(e) => debug!(request_id = %request_id, error = %e, "unserializable request"),
            }
        }

        let result = self.inner.handle(envelope).await;

        match &result {
            Ok(response) if enabled!(Level::DEBUG) => match serde_json::to_string(response) {
                Ok(json) => debug!(request_id = %request_id, response = %json, "skill response"),
                Err(e) => debug!(request_id = %request_id, error = %e, "unserializable response"),
            },
            Ok(_) => {}
            Err(e) => debug!(request_id = %request_id, error = %e, "skill request failed"),
        }
        result
    }
}
