//! One chat session: the transcript plus the send sequence that grows it.
//!
//! A send moves through `AwaitingResponse` to `Resolved` or `Failed` and
//! never backwards. The user message is appended before any network call,
//! the advisory call (if configured) finishes before the primary call
//! starts, and exactly one model message is appended per send.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::gemini::{GenerateContentRequest, Part, SystemInstruction};
use crate::core::advisor::{DeepSeekAdvisor, SentimentAdvisor};
use crate::core::config::Settings;
use crate::core::conversation::Conversation;
use crate::core::gemini::{ChatProvider, GeminiClient};
use crate::core::message::{Attachment, ChatMessage};
use crate::core::prompt::{build_contents, system_instruction, FALLBACK_REPLY};
use crate::core::provider_error::ProviderError;
use crate::core::reply::ParsedReply;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    /// Nothing sent yet in this session.
    Ready,
    AwaitingResponse,
    Resolved,
    Failed,
}

impl SendState {
    pub fn is_awaiting(self) -> bool {
        self == SendState::AwaitingResponse
    }
}

/// Everything the background half of a send needs, captured when the user
/// message is appended.
#[derive(Debug, Clone)]
pub struct PendingSend {
    pub generation: u64,
    /// Provider-visible messages before the new one.
    pub history: Vec<ChatMessage>,
    pub text: String,
    pub attachment: Option<Attachment>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Resolved(ChatMessage),
    Failed(ChatMessage),
}

impl SendOutcome {
    pub fn message(&self) -> &ChatMessage {
        match self {
            SendOutcome::Resolved(message) | SendOutcome::Failed(message) => message,
        }
    }

    pub fn into_message(self) -> ChatMessage {
        match self {
            SendOutcome::Resolved(message) | SendOutcome::Failed(message) => message,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SendOutcome::Failed(_))
    }
}

#[derive(Debug, Clone)]
pub struct SendResult {
    pub generation: u64,
    pub outcome: SendOutcome,
}

/// Runs the network half of a send against the configured providers.
pub struct Orchestrator {
    primary: Arc<dyn ChatProvider>,
    advisor: Option<Arc<dyn SentimentAdvisor>>,
}

impl Orchestrator {
    pub fn new(
        primary: Arc<dyn ChatProvider>,
        advisor: Option<Arc<dyn SentimentAdvisor>>,
    ) -> Self {
        Self { primary, advisor }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ProviderError> {
        let primary: Arc<dyn ChatProvider> = Arc::new(GeminiClient::new(settings.primary.clone())?);
        let advisor = match &settings.secondary {
            Some(secondary) => {
                Some(Arc::new(DeepSeekAdvisor::new(secondary.clone())?) as Arc<dyn SentimentAdvisor>)
            }
            None => None,
        };
        Ok(Self::new(primary, advisor))
    }

    pub fn has_advisor(&self) -> bool {
        self.advisor.is_some()
    }

    pub async fn resolve(&self, pending: &PendingSend) -> SendOutcome {
        let insight = match &self.advisor {
            Some(advisor) if !pending.text.trim().is_empty() => advisor.advise(&pending.text).await,
            _ => None,
        };

        let request = GenerateContentRequest {
            contents: build_contents(&pending.history, &pending.text, pending.attachment.as_ref()),
            system_instruction: SystemInstruction {
                parts: vec![Part::text(system_instruction(insight.as_ref()))],
            },
        };

        match self.primary.generate(&request).await {
            Ok(raw) => {
                let (text, result) = ParsedReply::parse(&raw).into_parts();
                debug!(structured = result.is_some(), "primary reply parsed");
                SendOutcome::Resolved(ChatMessage::model(text, result))
            }
            Err(err) => {
                warn!(error = %err, "primary provider call failed");
                SendOutcome::Failed(ChatMessage::model(FALLBACK_REPLY, None))
            }
        }
    }
}

pub struct ChatSession {
    conversation: Conversation,
    state: SendState,
    orchestrator: Arc<Orchestrator>,
}

impl ChatSession {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            conversation: Conversation::new(),
            state: SendState::Ready,
            orchestrator,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn state(&self) -> SendState {
        self.state
    }

    pub fn orchestrator(&self) -> Arc<Orchestrator> {
        Arc::clone(&self.orchestrator)
    }

    pub fn can_send(&self, text: &str, attachment: Option<&Attachment>) -> bool {
        !self.state.is_awaiting() && (!text.trim().is_empty() || attachment.is_some())
    }

    /// Append the user message and enter `AwaitingResponse`.
    ///
    /// Returns `None` (and changes nothing) when there is nothing to send or
    /// a send is already in flight.
    pub fn begin_send(&mut self, text: &str, attachment: Option<Attachment>) -> Option<PendingSend> {
        if !self.can_send(text, attachment.as_ref()) {
            return None;
        }

        let history = self.conversation.messages().to_vec();
        self.conversation
            .push(ChatMessage::user(text, attachment.clone()));
        self.state = SendState::AwaitingResponse;

        Some(PendingSend {
            generation: self.conversation.generation(),
            history,
            text: text.to_string(),
            attachment,
        })
    }

    /// Append the model message of a finished send.
    ///
    /// Results from before a reset are dropped. Returns whether a message
    /// was appended.
    pub fn complete_send(&mut self, result: SendResult) -> bool {
        if !self.state.is_awaiting() {
            return false;
        }

        let failed = result.outcome.is_failed();
        self.state = if failed {
            SendState::Failed
        } else {
            SendState::Resolved
        };

        if result.generation != self.conversation.generation() {
            debug!("dropping reply for a conversation that was reset");
            return false;
        }

        self.conversation.push(result.outcome.into_message());
        true
    }

    /// Run a whole send in place. Used where nothing else needs the session
    /// while the request is in flight.
    pub async fn send(&mut self, text: &str, attachment: Option<Attachment>) -> Option<&ChatMessage> {
        let pending = self.begin_send(text, attachment)?;
        let outcome = self.orchestrator.resolve(&pending).await;
        let appended = self.complete_send(SendResult {
            generation: pending.generation,
            outcome,
        });
        if appended {
            self.conversation.last()
        } else {
            None
        }
    }

    /// Empty the transcript. A send in flight keeps the send affordance
    /// disabled until it finishes, but its reply is discarded.
    pub fn reset(&mut self) {
        self.conversation.clear();
        if !self.state.is_awaiting() {
            self.state = SendState::Ready;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::gemini::Content;
    use crate::core::message::{SentimentCategory, SentimentResult};
    use crate::core::prompt::SYSTEM_INSTRUCTION;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakePrimary {
        reply: Option<String>,
        requests: Mutex<Vec<GenerateContentRequest>>,
    }

    impl FakePrimary {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply.to_string()),
                ..Default::default()
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn last_request(&self) -> GenerateContentRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl ChatProvider for FakePrimary {
        async fn generate(
            &self,
            request: &GenerateContentRequest,
        ) -> Result<String, ProviderError> {
            self.requests.lock().unwrap().push(request.clone());
            self.reply.clone().ok_or(ProviderError::EmptyResponse {
                provider: "fake",
            })
        }
    }

    struct FakeAdvisor {
        result: Option<SentimentResult>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SentimentAdvisor for FakeAdvisor {
        async fn advise(&self, _text: &str) -> Option<SentimentResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn advisor(result: Option<SentimentResult>) -> Arc<FakeAdvisor> {
        Arc::new(FakeAdvisor {
            result,
            calls: AtomicUsize::new(0),
        })
    }

    fn positive() -> SentimentResult {
        SentimentResult {
            sentiment: SentimentCategory::Positive,
            confidence: 0.9,
            emoji: "😊".to_string(),
            explanation: "نص إيجابي".to_string(),
        }
    }

    fn session(primary: Arc<FakePrimary>, advisor: Option<Arc<FakeAdvisor>>) -> ChatSession {
        let advisor = advisor.map(|a| a as Arc<dyn SentimentAdvisor>);
        ChatSession::new(Arc::new(Orchestrator::new(primary, advisor)))
    }

    fn system_text(request: &GenerateContentRequest) -> String {
        match &request.system_instruction.parts[0] {
            Part::Text { text } => text.clone(),
            other => panic!("unexpected part {other:?}"),
        }
    }

    fn texts(content: &Content) -> Vec<String> {
        content
            .parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.clone()),
                Part::InlineData { .. } => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn empty_send_is_a_no_op() {
        let primary = FakePrimary::replying("hi");
        let ds = advisor(Some(positive()));
        let mut session = session(primary.clone(), Some(ds.clone()));

        assert!(session.send("   ", None).await.is_none());
        assert!(session.conversation().is_empty());
        assert_eq!(session.state(), SendState::Ready);
        assert_eq!(primary.calls(), 0);
        assert_eq!(ds.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn structured_reply_uses_explanation_as_text() {
        let primary = FakePrimary::replying(
            r#"Hello, {"sentiment":"إيجابي","confidence":0.9,"emoji":"😊","explanation":"نص إيجابي"} end"#,
        );
        let mut session = session(primary, None);

        let reply = session.send("يوم جميل", None).await.unwrap().clone();
        assert!(reply.is_model());
        assert_eq!(reply.text, "نص إيجابي");
        assert_eq!(reply.sentiment_result, Some(positive()));
        assert_eq!(session.state(), SendState::Resolved);
        assert_eq!(session.conversation().len(), 2);
    }

    #[tokio::test]
    async fn plain_reply_is_kept_verbatim() {
        let raw = "مرحباً! كيف يمكنني مساعدتك اليوم؟";
        let mut session = session(FakePrimary::replying(raw), None);

        let reply = session.send("hello", None).await.unwrap();
        assert_eq!(reply.text, raw);
        assert!(reply.sentiment_result.is_none());
    }

    #[tokio::test]
    async fn primary_failure_appends_single_fallback() {
        let mut session = session(FakePrimary::failing(), None);

        let reply = session.send("hello", None).await.unwrap().clone();
        assert_eq!(reply.text, FALLBACK_REPLY);
        assert!(reply.sentiment_result.is_none());
        assert_eq!(session.state(), SendState::Failed);
        assert!(!session.state().is_awaiting());

        let messages = session.conversation().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages.iter().filter(|m| m.text == FALLBACK_REPLY).count(),
            1
        );
    }

    #[tokio::test]
    async fn advisor_insight_is_folded_into_system_instruction() {
        let primary = FakePrimary::replying("ok");
        let ds = advisor(Some(positive()));
        let mut session = session(primary.clone(), Some(ds.clone()));

        session.send("I love this", None).await;
        assert_eq!(ds.calls.load(Ordering::SeqCst), 1);
        let system = system_text(&primary.last_request());
        assert!(system.starts_with(SYSTEM_INSTRUCTION));
        assert!(system.contains("DeepSeek Insight: {\"sentiment\":\"إيجابي\""));

        // The insight is never shown to the user.
        assert!(session
            .conversation()
            .messages()
            .iter()
            .all(|m| !m.text.contains("DeepSeek")));
    }

    #[tokio::test]
    async fn advisor_failure_does_not_block_primary() {
        let primary = FakePrimary::replying("ok");
        let mut session = session(primary.clone(), Some(advisor(None)));

        let reply = session.send("text", None).await.unwrap();
        assert_eq!(reply.text, "ok");
        assert_eq!(system_text(&primary.last_request()), SYSTEM_INSTRUCTION);
    }

    #[tokio::test]
    async fn advisor_is_skipped_for_attachment_only_sends() {
        let primary = FakePrimary::replying("ok");
        let ds = advisor(Some(positive()));
        let mut session = session(primary.clone(), Some(ds.clone()));
        let image = Attachment::from_bytes(b"png", "image/png", "a.png");

        session.send("", Some(image)).await;
        assert_eq!(ds.calls.load(Ordering::SeqCst), 0);
        let request = primary.last_request();
        assert_eq!(texts(&request.contents[0]), ["حلل هذا المرفق"]);
        assert_eq!(request.contents[0].parts.len(), 2);
    }

    #[tokio::test]
    async fn history_is_sent_with_prior_results() {
        let primary = FakePrimary::replying(
            r#"{"sentiment":"إيجابي","confidence":0.9,"emoji":"😊","explanation":"نص إيجابي"}"#,
        );
        let mut session = session(primary.clone(), None);
        session.send("first", None).await;
        session.send("second", None).await;

        let request = primary.last_request();
        let roles: Vec<_> = request.contents.iter().map(|c| c.role.as_str()).collect();
        assert_eq!(roles, ["user", "model", "user"]);
        assert!(texts(&request.contents[1])[0].contains("[Result: "));
        assert_eq!(texts(&request.contents[2]), ["second"]);
    }

    #[tokio::test]
    async fn begin_send_blocks_second_send_while_awaiting() {
        let mut session = session(FakePrimary::replying("ok"), None);
        let pending = session.begin_send("one", None).unwrap();
        assert!(session.state().is_awaiting());
        assert!(session.begin_send("two", None).is_none());
        assert_eq!(session.conversation().len(), 1);

        let outcome = session.orchestrator().resolve(&pending).await;
        assert!(session.complete_send(SendResult {
            generation: pending.generation,
            outcome,
        }));
        assert!(session.begin_send("two", None).is_some());
    }

    #[tokio::test]
    async fn reset_discards_in_flight_reply() {
        let mut session = session(FakePrimary::replying("late"), None);
        let pending = session.begin_send("one", None).unwrap();
        session.reset();
        assert!(session.conversation().is_empty());
        assert!(session.state().is_awaiting());

        let outcome = session.orchestrator().resolve(&pending).await;
        assert!(!session.complete_send(SendResult {
            generation: pending.generation,
            outcome,
        }));
        assert!(session.conversation().is_empty());
        assert_eq!(session.state(), SendState::Resolved);
    }

    #[tokio::test]
    async fn reset_empties_any_transcript() {
        let mut session = session(FakePrimary::replying("ok"), None);
        session.reset();
        assert!(session.conversation().is_empty());

        session.send("a", None).await;
        session.reset();
        assert!(session.conversation().is_empty());
        assert_eq!(session.state(), SendState::Ready);
    }
}
