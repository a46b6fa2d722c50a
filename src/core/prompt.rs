//! Fixed product text and the mapping from transcript to provider turns.

use crate::api::gemini::{Content, Part};
use crate::core::message::{Attachment, ChatMessage, SentimentResult};

pub const SYSTEM_INSTRUCTION: &str = r#"أنت "خبير المشاعر البصري واللفظي الهجين".
مهمتك:
1. إذا أرسل المستخدم صورة: حلل العناصر البصرية العاطفية (الألوان، التعبيرات، الجو العام) واستخرج أي نصوص بداخلها.
2. إذا أرسل نصاً: حلل المشاعر الكامنة خلف الكلمات.
3. قدم تحليلاً "هجيناً" يجمع بين الرؤية البصرية والتحليل النصي.

دائماً قدم النتيجة بتنسيق JSON إذا كان هناك تحليل مشاعر مطلوب:
{
  "sentiment": "إيجابي" | "سلبي" | "محايد",
  "confidence": number,
  "emoji": string,
  "explanation": "شرح مفصل يدمج الجوانب البصرية والنصية"
}
إذا لم يكن هناك تحليل، أجب بشكل حواري طبيعي."#;

/// Text of the new turn when the user sent only an attachment.
pub const DEFAULT_ATTACHMENT_PROMPT: &str = "حلل هذا المرفق";

/// The one message shown when the primary call fails for any reason.
pub const FALLBACK_REPLY: &str = "عذراً، واجهت مشكلة في معالجة هذا المرفق. تأكد من أن الملف سليم.";

/// Upper bound on text taken from a plain-text attachment.
pub const MAX_INLINE_TEXT_CHARS: usize = 30_000;

pub fn advisor_prompt(text: &str) -> String {
    format!(
        "Analyze sentiment of this text: {text}. Output JSON with keys: sentiment, confidence, emoji, explanation."
    )
}

pub fn system_instruction(insight: Option<&SentimentResult>) -> String {
    match insight {
        Some(result) => format!(
            "{SYSTEM_INSTRUCTION}\nDeepSeek Insight: {}",
            result.to_prompt_json()
        ),
        None => SYSTEM_INSTRUCTION.to_string(),
    }
}

/// Parts carrying an attachment's content.
///
/// Images and PDFs go inline; plain text is decoded and sent as a text part
/// so the model can read it.
pub fn attachment_parts(attachment: &Attachment) -> Vec<Part> {
    if attachment.is_image() || attachment.is_pdf() {
        return vec![Part::inline(
            attachment.media_type.clone(),
            attachment.encoded_data.clone(),
        )];
    }

    if attachment.is_plain_text() {
        if let Ok(bytes) = attachment.decode() {
            let text = String::from_utf8_lossy(&bytes);
            let text: String = text.chars().take(MAX_INLINE_TEXT_CHARS).collect();
            return vec![Part::text(format!(
                "[{name}]\n{text}\n[/{name}]",
                name = attachment.name
            ))];
        }
    }

    Vec::new()
}

/// A prior transcript entry as a provider turn.
pub fn history_turn(message: &ChatMessage) -> Content {
    let mut text = message.text.clone();
    if let Some(result) = &message.sentiment_result {
        text.push_str(&format!(" [Result: {}]", result.to_prompt_json()));
    }

    let mut parts = vec![Part::text(text)];
    if let Some(attachment) = &message.attachment {
        parts.extend(attachment_parts(attachment));
    }

    Content {
        role: message.role.as_str().to_string(),
        parts,
    }
}

pub fn new_user_turn(text: &str, attachment: Option<&Attachment>) -> Content {
    let text = if text.trim().is_empty() {
        DEFAULT_ATTACHMENT_PROMPT
    } else {
        text
    };

    let mut parts = vec![Part::text(text)];
    if let Some(attachment) = attachment {
        parts.extend(attachment_parts(attachment));
    }

    Content {
        role: "user".to_string(),
        parts,
    }
}

/// Full `contents` list: prior turns followed by the new one.
pub fn build_contents(
    history: &[ChatMessage],
    text: &str,
    attachment: Option<&Attachment>,
) -> Vec<Content> {
    let mut contents: Vec<Content> = history.iter().map(history_turn).collect();
    contents.push(new_user_turn(text, attachment));
    contents
}
