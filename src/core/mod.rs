pub mod advisor;
pub mod app;
pub mod attachment;
pub mod config;
pub mod conversation;
pub mod gemini;
pub mod message;
pub mod prompt;
pub mod provider_error;
pub mod reply;
pub mod session;
