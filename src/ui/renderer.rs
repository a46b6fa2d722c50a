use std::time::Duration;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::app::App;
use crate::ui::theme::Theme;
use crate::ui::transcript::{attachment_chip, build_display_lines, help_lines, wrap_lines};

/// Pulsing indicator for the thinking line, two cycles per second.
pub fn pulse_symbol(elapsed: Duration) -> &'static str {
    let phase = (elapsed.as_millis() as f32 / 1000.0 * 2.0) % 2.0;
    let intensity = if phase < 1.0 { phase } else { 2.0 - phase };

    if intensity < 0.33 {
        "○"
    } else if intensity < 0.66 {
        "◐"
    } else {
        "●"
    }
}

pub fn title_text(app: &App) -> String {
    format!(
        "Sentiment Oracle v{} - {} • Advisor: {} • Logging: {}",
        env!("CARGO_PKG_VERSION"),
        app.primary_model,
        if app.advisor_enabled() { "on" } else { "off" },
        app.logging.get_status_string()
    )
}

fn input_title(app: &App) -> &'static str {
    if app.is_awaiting() {
        "Waiting for the oracle... (Ctrl+L to clear, Ctrl+C to quit)"
    } else {
        "Message (Enter to send, Alt+Enter for new line, /help for help, Ctrl+C to quit)"
    }
}

pub fn ui(f: &mut Frame, app: &mut App, theme: &Theme) {
    let input_height = app.ui.input_height();
    let has_footer = app.ui.staged.is_some() || app.ui.status.is_some();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(u16::from(has_footer)),
            Constraint::Length(input_height + 2),
        ])
        .split(f.area());

    let awaiting = app.is_awaiting();
    let pulse = pulse_symbol(app.ui.pulse_start.elapsed());
    let mut lines = build_display_lines(
        app.session.conversation().messages(),
        awaiting,
        pulse,
        theme,
    );
    if let Some(help) = &app.ui.help {
        lines.extend(help_lines(help, theme));
    }
    // Pre-wrapped, so one line is one row and the scroll math is exact.
    let lines = wrap_lines(lines, chunks[0].width);

    // The title takes the first row of the transcript area.
    let available_height = chunks[0].height.saturating_sub(1);
    let total_rows = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let max_offset = total_rows.saturating_sub(available_height);
    app.ui.max_scroll_offset = max_offset;
    app.ui.scroll_offset = if app.ui.auto_scroll {
        max_offset
    } else {
        app.ui.scroll_offset.min(max_offset)
    };

    let transcript = Paragraph::new(lines)
        .block(Block::default().title(Span::styled(title_text(app), theme.title_style)))
        .scroll((app.ui.scroll_offset, 0));
    f.render_widget(transcript, chunks[0]);

    if has_footer {
        let mut spans = Vec::new();
        if let Some(attachment) = &app.ui.staged {
            spans.push(Span::styled(
                format!("{} ✕ /detach", attachment_chip(attachment)),
                theme.attachment_style,
            ));
        }
        if let Some(status) = &app.ui.status {
            if !spans.is_empty() {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(status.clone(), theme.status_style));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), chunks[1]);
    }

    let border_style = if awaiting {
        theme.input_disabled_border_style
    } else {
        theme.input_border_style
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(input_title(app));
    let inner = block.inner(chunks[2]);
    f.render_widget(block, chunks[2]);
    f.render_widget(app.ui.textarea(), inner);
}
