//! Wire payloads for the two provider APIs.

pub mod deepseek;
pub mod gemini;
