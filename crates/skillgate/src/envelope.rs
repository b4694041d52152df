//! Request and response envelope types exchanged with the skill service.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// SDK version echoed in every response envelope.
pub const RESPONSE_VERSION: &str = "1.0";

/// Data sent by the skill service when initiating a request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default)]
    pub version: String,

    /// Absent for requests outside a session (e.g. audio player events).
    #[serde(default)]
    pub session: Option<Session>,

    pub request: Request,

    #[serde(default)]
    pub context: Option<Context>,
}

impl RequestEnvelope {
    /// The application the request is addressed to.
    ///
    /// Prefers the session's application and falls back to the context's
    /// system application for session-less requests.
    pub fn application_id(&self) -> &str {
        self.session
            .as_ref()
            .map(|s| s.application.application_id.as_str())
            .filter(|id| !id.is_empty())
            .or_else(|| {
                self.context
                    .as_ref()
                    .map(|c| c.system.application.application_id.as_str())
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(rename = "type")]
    pub request_type: String,

    #[serde(default)]
    pub request_id: String,

    /// RFC 3339 timestamp of when the request was sent.
    #[serde(default)]
    pub timestamp: String,

    #[serde(default)]
    pub intent: Intent,

    #[serde(default)]
    pub locale: String,

    /// Audio player stream token.
    #[serde(default)]
    pub token: String,

    #[serde(default)]
    pub offset_in_milliseconds: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Intent {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub slots: HashMap<String, IntentSlot>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntentSlot {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub new: bool,

    #[serde(default)]
    pub session_id: String,

    #[serde(default)]
    pub attributes: Map<String, Value>,

    #[serde(default)]
    pub user: User,

    #[serde(default)]
    pub application: Application,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(default)]
    pub application_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub user_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(default)]
    pub permissions: Permissions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Context {
    #[serde(rename = "AudioPlayer", default)]
    pub audio_player: AudioPlayer,

    #[serde(rename = "System", default)]
    pub system: System,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioPlayer {
    #[serde(default)]
    pub player_activity: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct System {
    #[serde(default)]
    pub application: Application,

    #[serde(default)]
    pub user: User,

    #[serde(default)]
    pub device: Device,

    #[serde(default)]
    pub api_endpoint: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(rename = "deviceId", default)]
    pub id: String,

    #[serde(default)]
    pub supported_interfaces: SupportedInterfaces,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportedInterfaces {
    #[serde(rename = "AudioPlayer", default, skip_serializing_if = "Option::is_none")]
    pub audio_player: Option<Value>,
}

/// Data the skill service expects back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_attributes: Option<Map<String, Value>>,

    pub response: Response,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,

    #[serde(rename = "shouldEndSession")]
    pub should_end_session: bool,
}

/// What the device should say.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpeech {
    #[serde(rename = "type")]
    pub speech_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssml: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    #[serde(rename = "type")]
    pub card_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Directive {
    #[serde(rename = "type")]
    pub directive_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_behavior: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_item: Option<AudioItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioItem {
    pub stream: Stream,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    pub token: String,

    pub url: String,

    #[serde(default)]
    pub offset_in_milliseconds: i64,
}
