//! Convenience constructors for response content.

use crate::envelope::{Card, OutputSpeech, Reprompt, Response};

impl OutputSpeech {
    /// Plain text speech.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            speech_type: "PlainText".to_string(),
            text: Some(text.into()),
            ssml: None,
        }
    }

    /// SSML speech; `ssml` should include the `<speak>` root.
    pub fn ssml(ssml: impl Into<String>) -> Self {
        Self {
            speech_type: "SSML".to_string(),
            text: None,
            ssml: Some(ssml.into()),
        }
    }
}

impl Card {
    pub fn simple(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            card_type: "Simple".to_string(),
            title: Some(title.into()),
            content: Some(content.into()),
            text: None,
            image: None,
        }
    }
}

impl Response {
    /// A response that says `speech` and keeps the session open.
    pub fn speak(speech: OutputSpeech) -> Self {
        Self {
            output_speech: Some(speech),
            ..Default::default()
        }
    }

    pub fn with_reprompt(mut self, speech: OutputSpeech) -> Self {
        self.reprompt = Some(Reprompt {
            output_speech: speech,
        });
        self
    }

    pub fn with_card(mut self, card: Card) -> Self {
        self.card = Some(card);
        self
    }

    pub fn end_session(mut self) -> Self {
        self.should_end_session = true;
        self
    }
}
