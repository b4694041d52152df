//! Application binding and freshness enforcement in front of a dispatcher.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::app::AppHandler;
use crate::clock::{Clock, SystemClock};
use crate::config::SkillConfig;
use crate::envelope::{RequestEnvelope, ResponseEnvelope};
use crate::error::SkillResult;
use crate::freshness::{validate_application_id, validate_timestamp};

/// Rejects envelopes addressed to another application or sent too long ago,
/// then delegates to `inner`.
///
/// The application id is checked before the timestamp; the inner handler is
/// never invoked for a rejected envelope.
pub struct StrictHandler<H> {
    inner: H,
    application_id: String,
    max_clock_skew: Duration,
    clock: Arc<dyn Clock>,
}

impl<H: AppHandler> StrictHandler<H> {
    pub fn new(inner: H, config: &SkillConfig) -> Self {
        Self {
            inner,
            application_id: config.application_id.clone(),
            max_clock_skew: config.max_clock_skew,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

#[async_trait]
impl<H: AppHandler> AppHandler for StrictHandler<H> {
    async fn handle(&self, envelope: &RequestEnvelope) -> SkillResult<ResponseEnvelope> {
        validate_application_id(envelope, &self.application_id)?;
        validate_timestamp(envelope, self.clock.now(), self.max_clock_skew)?;
        self.inner.handle(envelope).await
    }
}
