//! Extracting the structured sentiment object from free-form model text.
//!
//! Providers are asked to embed a JSON object in their reply when a
//! sentiment judgment applies, but they wrap it in prose, code fences or
//! nothing at all. Only the first balanced `{...}` span is considered: it
//! must validate against [`result_schema`] or the whole reply is plain
//! conversation.

use std::sync::OnceLock;

use memchr::memchr_iter;
use serde_json::{json, Value};

use crate::core::message::SentimentResult;

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedReply {
    Structured(SentimentResult),
    PlainText(String),
}

impl ParsedReply {
    pub fn parse(raw: &str) -> Self {
        match find_structured_result(raw) {
            Some(result) => ParsedReply::Structured(result),
            None => ParsedReply::PlainText(raw.to_string()),
        }
    }

    /// Text shown in the transcript: the explanation for structured replies,
    /// the untouched response otherwise.
    pub fn display_text(&self) -> &str {
        match self {
            ParsedReply::Structured(result) => &result.explanation,
            ParsedReply::PlainText(text) => text,
        }
    }

    pub fn into_parts(self) -> (String, Option<SentimentResult>) {
        match self {
            ParsedReply::Structured(result) => (result.explanation.clone(), Some(result)),
            ParsedReply::PlainText(text) => (text, None),
        }
    }
}

pub fn result_schema() -> Value {
    json!({
        "type": "object",
        "required": ["sentiment", "confidence", "emoji", "explanation"],
        "properties": {
            "sentiment": { "type": "string" },
            "confidence": { "type": "number", "minimum": 0, "maximum": 1 },
            "emoji": { "type": "string" },
            "explanation": { "type": "string" }
        }
    })
}

fn validator() -> Option<&'static jsonschema::Validator> {
    static VALIDATOR: OnceLock<Option<jsonschema::Validator>> = OnceLock::new();
    VALIDATOR
        .get_or_init(|| jsonschema::validator_for(&result_schema()).ok())
        .as_ref()
}

/// Validate a value that should be exactly one structured result.
pub fn result_from_value(value: &Value) -> Option<SentimentResult> {
    if !validator()?.is_valid(value) {
        return None;
    }
    // The category set is enforced by the enum's deserializer.
    serde_json::from_value(value.clone()).ok()
}

/// Parse a string that should be exactly one structured result.
pub fn result_from_json(text: &str) -> Option<SentimentResult> {
    let value: Value = serde_json::from_str(text.trim()).ok()?;
    result_from_value(&value)
}

pub fn find_structured_result(raw: &str) -> Option<SentimentResult> {
    let (start, end) = first_balanced_object(raw.as_bytes())?;
    // Braces are ASCII, so both offsets sit on char boundaries.
    result_from_json(&raw[start..=end])
}

/// Byte span of the first `{` that closes balanced.
fn first_balanced_object(bytes: &[u8]) -> Option<(usize, usize)> {
    memchr_iter(b'{', bytes)
        .find_map(|start| balanced_object_end(bytes, start).map(|end| (start, end)))
}

/// Index of the `}` closing the object opened at `start`, skipping braces
/// inside string literals.
fn balanced_object_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }

    None
}
