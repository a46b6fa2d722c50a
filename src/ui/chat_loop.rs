//! Event polling, key handling, and the draw loop for the chat view.
//!
//! The loop owns the [`App`]. Terminal events arrive from a reader task
//! over a channel, and each send runs in its own Tokio task whose
//! [`SendResult`] comes back over a second channel.

use std::{
    error::Error,
    io,
    path::Path,
    time::{Duration, Instant},
};

use ratatui::crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::debug;

use crate::commands::{expand_home, process_input, unquote, CommandResult};
use crate::core::app::App;
use crate::core::session::{PendingSend, SendResult};
use crate::ui::renderer::ui;
use crate::ui::theme::Theme;

type ChatTerminal = Terminal<CrosstermBackend<io::Stdout>>;

const PAGE_SCROLL: u16 = 10;

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

#[derive(Debug)]
pub enum KeyOutcome {
    Redraw,
    Send(PendingSend),
    Exit,
}

pub fn handle_key(app: &mut App, key: KeyEvent) -> KeyOutcome {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => {
            app.ui.exit_requested = true;
            KeyOutcome::Exit
        }
        KeyCode::Char('l') if ctrl => {
            app.reset();
            KeyOutcome::Redraw
        }
        KeyCode::Esc if app.ui.help.is_some() => {
            app.ui.help = None;
            KeyOutcome::Redraw
        }
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
            app.ui.apply_textarea_edit(|ta| ta.insert_newline());
            KeyOutcome::Redraw
        }
        KeyCode::Enter => submit_draft(app),
        KeyCode::PageUp => {
            app.scroll_up(PAGE_SCROLL);
            KeyOutcome::Redraw
        }
        KeyCode::PageDown => {
            app.scroll_down(PAGE_SCROLL);
            KeyOutcome::Redraw
        }
        // Multi-line drafts keep Up/Down for cursor movement.
        KeyCode::Up if app.ui.input_height() == 1 => {
            app.scroll_up(1);
            KeyOutcome::Redraw
        }
        KeyCode::Down if app.ui.input_height() == 1 => {
            app.scroll_down(1);
            KeyOutcome::Redraw
        }
        _ => {
            app.ui.apply_textarea_edit(|ta| {
                ta.input(tui_textarea::Input::from(key));
            });
            KeyOutcome::Redraw
        }
    }
}

fn submit_draft(app: &mut App) -> KeyOutcome {
    let draft = app.ui.input_text();
    match process_input(app, &draft) {
        CommandResult::Continue => {
            app.ui.clear_input();
            KeyOutcome::Redraw
        }
        CommandResult::Exit => KeyOutcome::Exit,
        CommandResult::ProcessAsMessage(text) => match app.submit(&text) {
            Some(pending) => KeyOutcome::Send(pending),
            None => KeyOutcome::Redraw,
        },
    }
}

pub(crate) fn sanitize_pasted_text(text: &str) -> String {
    let without_crlf = text.replace("\r\n", "\n");
    let without_cr = without_crlf.replace('\r', "\n");
    without_cr
        .replace('\t', "    ")
        .chars()
        .filter(|&c| c == '\n' || !c.is_control())
        .collect()
}

/// A paste that is exactly one existing file path is treated as a dropped
/// file and staged; anything else goes into the draft.
pub fn handle_paste(app: &mut App, text: &str) {
    let sanitized = sanitize_pasted_text(text);
    let candidate = unquote(sanitized.trim());
    if !candidate.is_empty() && !candidate.contains('\n') {
        let path = expand_home(candidate);
        if Path::new(&path).is_file() {
            app.stage_attachment(&path);
            return;
        }
    }

    if !sanitized.is_empty() {
        app.ui.apply_textarea_edit(|ta| {
            ta.insert_str(&sanitized);
        });
    }
}

fn spawn_send(app: &App, pending: PendingSend, result_tx: mpsc::UnboundedSender<SendResult>) {
    let orchestrator = app.session.orchestrator();
    tokio::spawn(async move {
        let outcome = orchestrator.resolve(&pending).await;
        if result_tx
            .send(SendResult {
                generation: pending.generation,
                outcome,
            })
            .is_err()
        {
            debug!("chat loop closed before the reply arrived");
        }
    });
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

fn setup_terminal() -> Result<ChatTerminal, Box<dyn Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout)).inspect_err(|_| {
        let _ = disable_raw_mode();
    })?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut ChatTerminal) -> Result<(), Box<dyn Error>> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn try_draw_frame(
    app: &mut App,
    theme: &Theme,
    terminal: &mut ChatTerminal,
    request_redraw: &mut bool,
    last_draw: &mut Instant,
    frame_duration: Duration,
) -> io::Result<()> {
    if !*request_redraw {
        return Ok(());
    }

    let now = Instant::now();
    if now.duration_since(*last_draw) < frame_duration {
        return Ok(());
    }

    terminal.draw(|f| ui(f, app, theme))?;
    *last_draw = now;
    *request_redraw = false;
    Ok(())
}

async fn event_loop(
    app: &mut App,
    terminal: &mut ChatTerminal,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
) -> Result<(), Box<dyn Error>> {
    const MAX_FPS: u64 = 60;
    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let theme = Theme::dark_default();
    let (result_tx, mut result_rx) = mpsc::unbounded_channel::<SendResult>();

    let mut last_draw = Instant::now() - frame_duration;
    let mut request_redraw = true;

    loop {
        if app.ui.exit_requested {
            return Ok(());
        }

        try_draw_frame(
            app,
            &theme,
            terminal,
            &mut request_redraw,
            &mut last_draw,
            frame_duration,
        )?;

        let mut events_processed = false;
        while let Ok(ev) = event_rx.try_recv() {
            events_processed = true;
            match ev {
                UiEvent::Crossterm(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    match handle_key(app, key) {
                        KeyOutcome::Exit => return Ok(()),
                        KeyOutcome::Send(pending) => {
                            spawn_send(app, pending, result_tx.clone());
                        }
                        KeyOutcome::Redraw => {}
                    }
                }
                UiEvent::Crossterm(Event::Paste(text)) => handle_paste(app, &text),
                UiEvent::Crossterm(_) => {}
            }
        }

        let mut received_any = false;
        while let Ok(result) = result_rx.try_recv() {
            received_any = true;
            app.apply_send_result(result);
        }

        // Keep the thinking pulse moving.
        if events_processed || received_any || app.is_awaiting() {
            request_redraw = true;
        }

        if !events_processed && !received_any {
            tokio::time::sleep(Duration::from_millis(16)).await;
        }
    }
}

pub async fn run_chat(mut app: App) -> Result<(), Box<dyn Error>> {
    let mut terminal = setup_terminal()?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);

    let result = event_loop(&mut app, &mut terminal, &mut event_rx).await;

    event_reader_handle.abort();
    restore_terminal(&mut terminal)?;
    result
}
