use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use base64::Engine as _;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Who authored a transcript entry. Both roles are sent to providers
/// under the same names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }

    pub fn display_label(self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Model => "Oracle AI",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Role::User),
            "model" => Ok(Role::Model),
            _ => Err(format!("invalid transcript role: {value}")),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

/// Sentiment category of a structured result.
///
/// Providers are asked for the Arabic labels, but the English words are
/// accepted as well. Serialization always produces the Arabic label so a
/// stored result can be fed back into a prompt unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SentimentCategory {
    Positive,
    Negative,
    Neutral,
}

impl SentimentCategory {
    pub const ALL: [SentimentCategory; 3] = [
        SentimentCategory::Positive,
        SentimentCategory::Negative,
        SentimentCategory::Neutral,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SentimentCategory::Positive => "إيجابي",
            SentimentCategory::Negative => "سلبي",
            SentimentCategory::Neutral => "محايد",
        }
    }

    pub fn english(self) -> &'static str {
        match self {
            SentimentCategory::Positive => "positive",
            SentimentCategory::Negative => "negative",
            SentimentCategory::Neutral => "neutral",
        }
    }

    /// Every spelling accepted when parsing a provider response.
    pub fn accepted_labels() -> Vec<&'static str> {
        Self::ALL
            .iter()
            .flat_map(|category| [category.label(), category.english()])
            .collect()
    }

    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ALL.into_iter().find(|category| {
            trimmed == category.label() || trimmed.eq_ignore_ascii_case(category.english())
        })
    }
}

impl TryFrom<String> for SentimentCategory {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown sentiment category: {value}"))
    }
}

impl From<SentimentCategory> for String {
    fn from(value: SentimentCategory) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for SentimentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The `{sentiment, confidence, emoji, explanation}` object a provider embeds
/// in its reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub sentiment: SentimentCategory,
    pub confidence: f64,
    pub emoji: String,
    pub explanation: String,
}

impl SentimentResult {
    /// Compact JSON used when a result is folded back into a prompt.
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn confidence_percent(&self) -> u16 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u16
    }
}

/// A user-supplied file, base64-encoded for transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub encoded_data: String,
    pub media_type: String,
    pub name: String,
}

impl Attachment {
    pub fn from_bytes(bytes: &[u8], media_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            encoded_data: base64::prelude::BASE64_STANDARD.encode(bytes),
            media_type: media_type.into(),
            name: name.into(),
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::prelude::BASE64_STANDARD.decode(&self.encoded_data)
    }

    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }

    pub fn is_pdf(&self) -> bool {
        self.media_type == "application/pdf"
    }

    pub fn is_plain_text(&self) -> bool {
        self.media_type == "text/plain"
    }
}

static NEXT_MESSAGE_SEQ: AtomicU64 = AtomicU64::new(1);

fn next_message_id(timestamp: &DateTime<Local>) -> String {
    let seq = NEXT_MESSAGE_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}-{seq}", timestamp.timestamp_millis())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_result: Option<SentimentResult>,
    pub timestamp: DateTime<Local>,
}

impl ChatMessage {
    fn new(role: Role, text: impl Into<String>) -> Self {
        let timestamp = Local::now();
        Self {
            id: next_message_id(&timestamp),
            role,
            text: text.into(),
            attachment: None,
            sentiment_result: None,
            timestamp,
        }
    }

    pub fn user(text: impl Into<String>, attachment: Option<Attachment>) -> Self {
        Self {
            attachment,
            ..Self::new(Role::User, text)
        }
    }

    pub fn model(text: impl Into<String>, sentiment_result: Option<SentimentResult>) -> Self {
        Self {
            sentiment_result,
            ..Self::new(Role::Model, text)
        }
    }

    pub fn is_model(&self) -> bool {
        self.role == Role::Model
    }
}
