//! TUI-less "say" command

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::attachment::AttachmentEncoder;
use crate::core::config::Settings;
use crate::core::message::{Attachment, ChatMessage};
use crate::core::session::{ChatSession, Orchestrator, SendState};
use crate::utils::logging::LoggingState;

pub const EXIT_RESOLVED: i32 = 0;
pub const EXIT_FAILED: i32 = 1;

/// Text printed for a finished reply.
pub fn format_reply(message: &ChatMessage, json: bool) -> Result<String, serde_json::Error> {
    if json {
        return serde_json::to_string_pretty(message);
    }

    let mut out = message.text.clone();
    if let Some(result) = &message.sentiment_result {
        out.push_str(&format!(
            "\n{} {} ({}) {}%",
            result.emoji,
            result.sentiment.label(),
            result.sentiment.english(),
            result.confidence_percent()
        ));
    }
    Ok(out)
}

/// Run one send through `session` and return the exit code plus the reply.
pub async fn say_once(
    session: &mut ChatSession,
    logging: &LoggingState,
    text: &str,
    attachment: Option<Attachment>,
) -> Result<(i32, Option<ChatMessage>), Box<dyn Error>> {
    let reply = session.send(text, attachment).await.cloned();

    for message in session.conversation().messages() {
        logging.log_message(message)?;
    }

    let code = match session.state() {
        SendState::Resolved => EXIT_RESOLVED,
        _ => EXIT_FAILED,
    };
    Ok((code, reply))
}

pub async fn run_say(
    text: Vec<String>,
    attach: Option<PathBuf>,
    json: bool,
    settings: &Settings,
    log: Option<String>,
) -> Result<i32, Box<dyn Error>> {
    let text = text.join(" ");
    if text.trim().is_empty() && attach.is_none() {
        eprintln!("Usage: sentiment-oracle say [--attach <path>] <text>");
        return Ok(EXIT_FAILED);
    }

    let attachment = match attach {
        Some(path) => {
            match AttachmentEncoder::new(settings.max_attachment_bytes).encode_path(&path) {
                Ok(attachment) => Some(attachment),
                Err(e) => {
                    eprintln!("⚠ {e}");
                    return Ok(EXIT_FAILED);
                }
            }
        }
        None => None,
    };

    let orchestrator = Orchestrator::from_settings(settings)?;
    let mut session = ChatSession::new(Arc::new(orchestrator));
    let logging = LoggingState::new(log.map(PathBuf::from))?;

    let (code, reply) = say_once(&mut session, &logging, &text, attachment).await?;
    if let Some(message) = reply {
        println!("{}", format_reply(&message, json)?);
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::gemini::GenerateContentRequest;
    use crate::core::gemini::ChatProvider;
    use crate::core::prompt::FALLBACK_REPLY;
    use crate::core::provider_error::ProviderError;
    use crate::utils::test_utils::ScriptedProvider;
    use tempfile::TempDir;

    struct DownProvider;

    #[async_trait::async_trait]
    impl ChatProvider for DownProvider {
        async fn generate(
            &self,
            _request: &GenerateContentRequest,
        ) -> Result<String, ProviderError> {
            Err(ProviderError::Timeout { provider: "test" })
        }
    }

    fn session_with(provider: Arc<dyn ChatProvider>) -> ChatSession {
        ChatSession::new(Arc::new(Orchestrator::new(provider, None)))
    }

    #[tokio::test]
    async fn resolved_reply_exits_zero_and_logs_both_messages() {
        let dir = TempDir::new().unwrap();
        let log_path = dir.path().join("say.log");
        let logging = LoggingState::new(Some(log_path.clone())).unwrap();
        let mut session = session_with(Arc::new(ScriptedProvider {
            reply: r#"{"sentiment":"سلبي","confidence":0.8,"emoji":"😢","explanation":"حزين"}"#
                .to_string(),
        }));

        let (code, reply) = say_once(&mut session, &logging, "يوم سيء", None)
            .await
            .unwrap();
        assert_eq!(code, EXIT_RESOLVED);

        let reply = reply.unwrap();
        assert_eq!(format_reply(&reply, false).unwrap(), "حزين\n😢 سلبي (negative) 80%");

        let logged = std::fs::read_to_string(log_path).unwrap();
        assert!(logged.contains("يوم سيء"));
        assert!(logged.contains("حزين"));
    }

    #[tokio::test]
    async fn failed_reply_exits_one_with_fallback() {
        let logging = LoggingState::new(None).unwrap();
        let mut session = session_with(Arc::new(DownProvider));

        let (code, reply) = say_once(&mut session, &logging, "hello", None)
            .await
            .unwrap();
        assert_eq!(code, EXIT_FAILED);
        assert_eq!(reply.unwrap().text, FALLBACK_REPLY);
    }

    #[test]
    fn json_output_is_the_serialized_message() {
        let message = ChatMessage::model("plain", None);
        let out = format_reply(&message, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["role"], "model");
        assert_eq!(value["text"], "plain");
        assert!(value.get("sentiment_result").is_none());
    }
}
