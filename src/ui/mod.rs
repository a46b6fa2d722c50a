//! Terminal UI layer for interactive chat sessions.
//!
//! - [`chat_loop`]: the event loop that dispatches keys and slash commands
//!   to [`crate::commands`] and runs each send on a background task.
//! - [`renderer`] and [`transcript`]: frame layout and the styled lines for
//!   messages, sentiment gauges, and the thinking indicator.
//! - [`theme`]: color and style policy.
//!
//! This layer presents and captures interaction state; [`crate::core`] owns
//! the conversation and provider coordination.

pub mod chat_loop;
pub mod renderer;
pub mod theme;
pub mod transcript;
