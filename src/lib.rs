//! Sentiment Oracle is a terminal chat that reads the sentiment behind text,
//! images and documents using remote LLM APIs.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation, attachment encoding, reply parsing, and
//!   the send sequence across the Gemini client and the DeepSeek advisor.
//! - [`ui`] renders the terminal interface and runs the interactive event
//!   loop.
//! - [`commands`] implements slash-command parsing and execution used by the
//!   chat loop.
//! - [`api`] defines the request and response payloads of both providers.
//! - [`utils`] holds URL, auth header, and transcript logging helpers.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which dispatches into [`ui::chat_loop`] for
//! interactive sessions and [`cli::say`] for one-shot sends.

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
