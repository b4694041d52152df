//! Routing of request envelopes to application handlers.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::envelope::{
    Context, Directive, Request, RequestEnvelope, Response, ResponseEnvelope, Session,
    RESPONSE_VERSION,
};
use crate::error::{SkillError, SkillResult};

/// Anything that turns a request envelope into a response envelope.
#[async_trait]
pub trait AppHandler: Send + Sync {
    async fn handle(&self, envelope: &RequestEnvelope) -> SkillResult<ResponseEnvelope>;
}

#[async_trait]
impl<H: AppHandler + ?Sized> AppHandler for Arc<H> {
    async fn handle(&self, envelope: &RequestEnvelope) -> SkillResult<ResponseEnvelope> {
        (**self).handle(envelope).await
    }
}

/// Launch, intent and session-ended requests.
///
/// Return a [`crate::ValidationError`] inside the `anyhow::Error` to reject
/// the request as invalid rather than failed.
#[async_trait]
pub trait SessionHandler: Send + Sync {
    async fn on_launch(
        &self,
        request: &Request,
        session: Option<&Session>,
        context: Option<&Context>,
    ) -> anyhow::Result<Response>;

    async fn on_intent(
        &self,
        request: &Request,
        session: Option<&Session>,
        context: Option<&Context>,
    ) -> anyhow::Result<Response>;

    async fn on_session_ended(
        &self,
        request: &Request,
        session: Option<&Session>,
        context: Option<&Context>,
    ) -> anyhow::Result<()>;
}

/// Audio player lifecycle events.
#[async_trait]
pub trait AudioHandler: Send + Sync {
    async fn on_playback_started(
        &self,
        request: &Request,
        context: Option<&Context>,
    ) -> anyhow::Result<Vec<Directive>>;

    async fn on_playback_finished(
        &self,
        request: &Request,
        context: Option<&Context>,
    ) -> anyhow::Result<Vec<Directive>>;

    async fn on_playback_stopped(
        &self,
        request: &Request,
        context: Option<&Context>,
    ) -> anyhow::Result<()>;

    async fn on_playback_nearly_finished(
        &self,
        request: &Request,
        context: Option<&Context>,
    ) -> anyhow::Result<Vec<Directive>>;

    async fn on_playback_failed(
        &self,
        request: &Request,
        context: Option<&Context>,
    ) -> anyhow::Result<Vec<Directive>>;
}

const AUDIO_PLAYER_PREFIX: &str = "AudioPlayer.";

/// Routes requests to the session or audio handler by request type.
#[derive(Clone)]
pub struct App {
    application_id: String,
    session_handler: Arc<dyn SessionHandler>,
    audio_handler: Option<Arc<dyn AudioHandler>>,
}

impl App {
    pub fn new(
        application_id: impl Into<String>,
        session_handler: Arc<dyn SessionHandler>,
    ) -> Self {
        Self {
            application_id: application_id.into(),
            session_handler,
            audio_handler: None,
        }
    }

    pub fn with_audio_handler(mut self, handler: Arc<dyn AudioHandler>) -> Self {
        self.audio_handler = Some(handler);
        self
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    async fn handle_audio(
        &self,
        handler: &dyn AudioHandler,
        envelope: &RequestEnvelope,
    ) -> SkillResult<Response> {
        let request = &envelope.request;
        let context = envelope.context.as_ref();
        let request_type = request.request_type.as_str();

        let result = match request_type {
            "AudioPlayer.PlaybackStarted" => handler.on_playback_started(request, context).await,
            "AudioPlayer.PlaybackFinished" => handler.on_playback_finished(request, context).await,
            "AudioPlayer.PlaybackStopped" => handler
                .on_playback_stopped(request, context)
                .await
                .map(|()| Vec::new()),
            "AudioPlayer.PlaybackNearlyFinished" => {
                handler.on_playback_nearly_finished(request, context).await
            }
            "AudioPlayer.PlaybackFailed" => handler.on_playback_failed(request, context).await,
            other => return Err(SkillError::UnhandledRequestType(other.to_string())),
        };

        let directives = result.map_err(|e| SkillError::from_handler(request_type, e))?;
        Ok(Response {
            directives,
            should_end_session: true,
            ..Default::default()
        })
    }
}

#[async_trait]
impl AppHandler for App {
    async fn handle(&self, envelope: &RequestEnvelope) -> SkillResult<ResponseEnvelope> {
        let request_type = envelope.request.request_type.as_str();
        debug!(
            request_type = %request_type,
            request_id = %envelope.request.request_id,
            "dispatching request"
        );

        let request = &envelope.request;
        let session = envelope.session.as_ref();
        let context = envelope.context.as_ref();
        let handler = &self.session_handler;

        let response = match request_type {
            "LaunchRequest" => handler
                .on_launch(request, session, context)
                .await
                .map_err(|e| SkillError::from_handler(request_type, e))?,
            "IntentRequest" => handler
                .on_intent(request, session, context)
                .await
                .map_err(|e| SkillError::from_handler(request_type, e))?,
            "SessionEndedRequest" => {
                handler
                    .on_session_ended(request, session, context)
                    .await
                    .map_err(|e| SkillError::from_handler(request_type, e))?;
                Response::default()
            }
            t if t.starts_with(AUDIO_PLAYER_PREFIX) => match &self.audio_handler {
                Some(audio) => self.handle_audio(audio.as_ref(), envelope).await?,
                None => return Err(SkillError::UnhandledRequestType(t.to_string())),
            },
            other => return Err(SkillError::UnhandledRequestType(other.to_string())),
        };

        Ok(ResponseEnvelope {
            version: RESPONSE_VERSION.to_string(),
            session_attributes: envelope.session.as_ref().map(|s| s.attributes.clone()),
            response,
        })
    }
}
