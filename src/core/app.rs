//! Interactive session state: the chat session plus the two pieces of UI
//! state the view owns (draft text and staged attachment).

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::warn;
use tui_textarea::TextArea;

use crate::core::attachment::AttachmentEncoder;
use crate::core::message::Attachment;
use crate::core::session::{ChatSession, Orchestrator, PendingSend, SendResult};
use crate::utils::logging::LoggingState;

pub struct UiState {
    textarea: TextArea<'static>,
    pub staged: Option<Attachment>,
    pub status: Option<String>,
    /// Command help shown under the transcript. Never part of the
    /// conversation.
    pub help: Option<String>,
    pub scroll_offset: u16,
    pub max_scroll_offset: u16,
    pub auto_scroll: bool,
    pub exit_requested: bool,
    pub pulse_start: Instant,
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

impl UiState {
    pub fn new() -> Self {
        Self {
            textarea: new_textarea(),
            staged: None,
            status: None,
            help: None,
            scroll_offset: 0,
            max_scroll_offset: 0,
            auto_scroll: true,
            exit_requested: false,
            pulse_start: Instant::now(),
        }
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }

    pub fn apply_textarea_edit<F>(&mut self, f: F)
    where
        F: FnOnce(&mut TextArea<'static>),
    {
        f(&mut self.textarea);
    }

    pub fn input_text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn set_input_text(&mut self, text: &str) {
        self.textarea = new_textarea();
        self.textarea.insert_str(text);
    }

    pub fn clear_input(&mut self) {
        self.textarea = new_textarea();
    }

    /// Rows the input box needs, capped so the transcript keeps most of the
    /// screen.
    pub fn input_height(&self) -> u16 {
        (self.textarea.lines().len() as u16).clamp(1, 6)
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }
}

fn new_textarea() -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_placeholder_text("اكتب رسالة أو ارفع ملفاً...");
    textarea
}

pub struct App {
    pub session: ChatSession,
    pub ui: UiState,
    pub logging: LoggingState,
    encoder: AttachmentEncoder,
    pub primary_model: String,
}

impl App {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        encoder: AttachmentEncoder,
        logging: LoggingState,
        primary_model: impl Into<String>,
    ) -> Self {
        Self {
            session: ChatSession::new(orchestrator),
            ui: UiState::new(),
            logging,
            encoder,
            primary_model: primary_model.into(),
        }
    }

    pub fn advisor_enabled(&self) -> bool {
        self.session.orchestrator().has_advisor()
    }

    pub fn is_awaiting(&self) -> bool {
        self.session.state().is_awaiting()
    }

    /// Stage the file at `path` for the next send. A rejected file leaves the
    /// previously staged attachment in place and only sets a warning.
    pub fn stage_attachment(&mut self, path: &Path) {
        match self.encoder.encode_path(path) {
            Ok(attachment) => {
                self.ui
                    .set_status(format!("Ready to analyze: {}", attachment.name));
                self.ui.staged = Some(attachment);
            }
            Err(err) => {
                self.ui.set_status(format!("⚠ {err}"));
            }
        }
    }

    pub fn clear_staged(&mut self) {
        if let Some(attachment) = self.ui.staged.take() {
            self.ui.set_status(format!("Removed {}", attachment.name));
        }
    }

    pub fn can_send(&self) -> bool {
        self.session
            .can_send(&self.ui.input_text(), self.ui.staged.as_ref())
    }

    /// Submit `text` with the staged attachment. On success the draft and
    /// the staged attachment are cleared and the user message is logged.
    pub fn submit(&mut self, text: &str) -> Option<PendingSend> {
        let pending = self.session.begin_send(text, self.ui.staged.clone())?;
        self.ui.staged = None;
        self.ui.clear_input();
        self.ui.status = None;
        self.ui.help = None;
        self.ui.auto_scroll = true;
        self.ui.pulse_start = Instant::now();
        self.log_last_message();
        Some(pending)
    }

    pub fn apply_send_result(&mut self, result: SendResult) {
        if self.session.complete_send(result) {
            self.ui.auto_scroll = true;
            self.log_last_message();
        }
    }

    pub fn reset(&mut self) {
        self.session.reset();
        self.ui.help = None;
        self.ui.scroll_offset = 0;
        self.ui.auto_scroll = true;
        self.ui.set_status("Conversation cleared");
    }

    fn log_last_message(&mut self) {
        let Some(message) = self.session.conversation().last() else {
            return;
        };
        if let Err(e) = self.logging.log_message(message) {
            warn!(error = %e, "transcript logging failed");
            self.ui.set_status(format!("Log error: {e}"));
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.ui.auto_scroll = false;
        self.ui.scroll_offset = self.ui.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max_offset = self.ui.max_scroll_offset;
        self.ui.scroll_offset = self.ui.scroll_offset.saturating_add(lines).min(max_offset);
        if self.ui.scroll_offset >= max_offset {
            self.ui.auto_scroll = true;
        }
    }
}
