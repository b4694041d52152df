//! The demo skill: greets on launch, says goodbye on stop.

use anyhow::bail;
use async_trait::async_trait;
use skillgate::envelope::{Context, Request, Session};
use skillgate::{OutputSpeech, Response, SessionHandler};

pub struct DemoSkill;

#[async_trait]
impl SessionHandler for DemoSkill {
    async fn on_launch(
        &self,
        _request: &Request,
        _session: Option<&Session>,
        _context: Option<&Context>,
    ) -> anyhow::Result<Response> {
        Ok(Response::speak(OutputSpeech::plain("Welcome to my app")))
    }

    async fn on_intent(
        &self,
        request: &Request,
        _session: Option<&Session>,
        _context: Option<&Context>,
    ) -> anyhow::Result<Response> {
        match request.intent.name.as_str() {
            "AMAZON.StopIntent" => {
                Ok(Response::speak(OutputSpeech::plain("Goodbye")).end_session())
            }
            other => bail!("unhandled intent: {}", other),
        }
    }

    async fn on_session_ended(
        &self,
        _request: &Request,
        _session: Option<&Session>,
        _context: Option<&Context>,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(name: &str) -> Request {
        let mut request = Request {
            request_type: "IntentRequest".into(),
            ..Default::default()
        };
        request.intent.name = name.into();
        request
    }

    #[tokio::test]
    async fn test_stop_ends_session() {
        let resp = DemoSkill
            .on_intent(&intent("AMAZON.StopIntent"), None, None)
            .await
            .unwrap();
        assert!(resp.should_end_session);
        assert_eq!(resp.output_speech, Some(OutputSpeech::plain("Goodbye")));
    }

    #[tokio::test]
    async fn test_other_intents_fail() {
        let err = DemoSkill
            .on_intent(&intent("PlayMusic"), None, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("PlayMusic"));
    }

    #[tokio::test]
    async fn test_launch_keeps_session_open() {
        let resp = DemoSkill
            .on_launch(&Request::default(), None, None)
            .await
            .unwrap();
        assert!(!resp.should_end_session);
    }
}
