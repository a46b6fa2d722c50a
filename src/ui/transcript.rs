//! Turning the conversation into styled lines.
//!
//! Everything here is a pure function of the transcript and a few flags so
//! the chat view can be tested without a terminal.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::message::{Attachment, ChatMessage, Role, SentimentResult};
use crate::ui::theme::Theme;

pub const GAUGE_WIDTH: usize = 20;
pub const THINKING_LABEL: &str = "Oracle is Thinking...";

pub fn welcome_lines(theme: &Theme) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(Span::styled("مرحباً بك في أوراكل المطور", theme.title_style)),
        Line::from(Span::styled(
            "يمكنك الآن إرسال صور، ملفات PDF، أو نصوص لتحليلها عاطفياً ورؤية ما يكمن خلفها.",
            theme.welcome_style,
        )),
        Line::from(Span::styled(
            "Type a message, or /attach <path> to add an image, PDF or text file. /help lists commands.",
            theme.welcome_style,
        )),
    ]
}

pub fn attachment_chip(attachment: &Attachment) -> String {
    let icon = if attachment.is_image() { "🖼" } else { "📄" };
    format!("{icon} {} ({})", attachment.name, attachment.media_type)
}

/// `█████░░░░░ 50%` style confidence bar.
pub fn confidence_gauge(confidence: f64, width: usize) -> (String, String) {
    let filled = ((confidence.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    ("█".repeat(filled), "░".repeat(width - filled))
}

pub fn sentiment_lines(result: &SentimentResult, theme: &Theme) -> Vec<Line<'static>> {
    let style = theme.sentiment_style(result.sentiment);
    let (filled, empty) = confidence_gauge(result.confidence, GAUGE_WIDTH);

    vec![
        Line::from(vec![
            Span::raw("  "),
            Span::raw(format!("{} ", result.emoji)),
            Span::styled(
                result.sentiment.label().to_string(),
                style.add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" ({})", result.sentiment.english()), theme.meta_style),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(filled, style),
            Span::styled(empty, theme.gauge_empty_style),
            Span::styled(format!(" {}%", result.confidence_percent()), style),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(result.explanation.clone(), theme.explanation_style),
        ]),
    ]
}

fn message_lines(message: &ChatMessage, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let (prefix_style, text_style) = match message.role {
        Role::User => (theme.user_prefix_style, theme.user_text_style),
        Role::Model => (theme.model_prefix_style, theme.model_text_style),
    };

    lines.push(Line::from(vec![
        Span::styled(message.role.display_label().to_string(), prefix_style),
        Span::styled(
            format!(" • {}", message.timestamp.format("%H:%M")),
            theme.meta_style,
        ),
    ]));

    if let Some(attachment) = &message.attachment {
        lines.push(Line::from(Span::styled(
            attachment_chip(attachment),
            theme.attachment_style,
        )));
    }

    for text_line in message.text.lines() {
        lines.push(Line::from(Span::styled(text_line.to_string(), text_style)));
    }

    if let Some(result) = &message.sentiment_result {
        lines.extend(sentiment_lines(result, theme));
    }

    lines.push(Line::from(""));
    lines
}

pub fn build_display_lines(
    messages: &[ChatMessage],
    awaiting: bool,
    pulse: &str,
    theme: &Theme,
) -> Vec<Line<'static>> {
    if messages.is_empty() && !awaiting {
        return welcome_lines(theme);
    }

    let mut lines: Vec<Line<'static>> = messages
        .iter()
        .flat_map(|message| message_lines(message, theme))
        .collect();

    if awaiting {
        lines.push(Line::from(Span::styled(
            format!("{pulse} {THINKING_LABEL}"),
            theme.thinking_style,
        )));
    }

    lines
}

pub fn help_lines(help: &str, theme: &Theme) -> Vec<Line<'static>> {
    help.lines()
        .map(|line| Line::from(Span::styled(line.to_string(), theme.help_style)))
        .chain(std::iter::once(Line::from("")))
        .collect()
}

/// Word-wrap styled lines to `width` columns so every returned line is
/// exactly one screen row. Continuation rows drop the whitespace they
/// break on, and words wider than a row are split.
pub fn wrap_lines(lines: Vec<Line<'static>>, width: u16) -> Vec<Line<'static>> {
    let width = usize::from(width.max(1));
    let mut rows = Vec::with_capacity(lines.len());
    for line in lines {
        if line.width() <= width {
            rows.push(line);
        } else {
            wrap_line(&line, width, &mut rows);
        }
    }
    rows
}

fn wrap_line(line: &Line<'static>, width: usize, out: &mut Vec<Line<'static>>) {
    let mut rows: Vec<Vec<Span<'static>>> = vec![Vec::new()];
    let mut row_width = 0usize;

    for span in &line.spans {
        for (is_space, token) in split_tokens(&span.content) {
            let token_width = token.width();

            if is_space {
                if row_width == 0 && rows.len() > 1 {
                    continue;
                }
                if row_width + token_width > width {
                    rows.push(Vec::new());
                    row_width = 0;
                    continue;
                }
            } else if row_width > 0 && row_width + token_width > width {
                rows.push(Vec::new());
                row_width = 0;
            }

            if row_width + token_width <= width {
                push_span(&mut rows, token.to_string(), span.style);
                row_width += token_width;
                continue;
            }

            for ch in token.chars() {
                let ch_width = ch.width().unwrap_or(0);
                if row_width > 0 && row_width + ch_width > width {
                    rows.push(Vec::new());
                    row_width = 0;
                }
                push_span(&mut rows, ch.to_string(), span.style);
                row_width += ch_width;
            }
        }
    }

    out.extend(
        rows.into_iter()
            .map(|spans| Line::from(spans).style(line.style)),
    );
}

fn push_span(rows: &mut [Vec<Span<'static>>], text: String, style: Style) {
    if let Some(row) = rows.last_mut() {
        row.push(Span::styled(text, style));
    }
}

/// Alternating runs of whitespace and non-whitespace, tagged with whether
/// the run is whitespace.
fn split_tokens(text: &str) -> Vec<(bool, &str)> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;

    for (index, ch) in text.char_indices() {
        let is_space = ch.is_whitespace();
        match current {
            Some(kind) if kind == is_space => {}
            Some(kind) => {
                tokens.push((kind, &text[start..index]));
                start = index;
                current = Some(is_space);
            }
            None => current = Some(is_space),
        }
    }
    if let Some(kind) = current {
        tokens.push((kind, &text[start..]));
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::SentimentCategory;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn empty_transcript_shows_welcome() {
        let lines = build_display_lines(&[], false, "●", &Theme::dark_default());
        assert!(plain(&lines).iter().any(|l| l.contains("/attach")));
    }

    #[test]
    fn awaiting_adds_thinking_line() {
        let messages = vec![ChatMessage::user("hi", None)];
        let lines = build_display_lines(&messages, true, "◐", &Theme::dark_default());
        assert_eq!(
            plain(&lines).last().unwrap(),
            &format!("◐ {THINKING_LABEL}")
        );
    }

    #[test]
    fn result_renders_widget() {
        let message = ChatMessage::model(
            "نص إيجابي",
            Some(SentimentResult {
                sentiment: SentimentCategory::Positive,
                confidence: 0.5,
                emoji: "😊".to_string(),
                explanation: "نص إيجابي".to_string(),
            }),
        );
        let text = plain(&build_display_lines(
            &[message],
            false,
            "●",
            &Theme::dark_default(),
        ));
        assert!(text[0].starts_with("Oracle AI • "));
        assert_eq!(text[1], "نص إيجابي");
        assert_eq!(text[2], "  😊 إيجابي (positive)");
        assert_eq!(
            text[3],
            format!("  {}{} 50%", "█".repeat(10), "░".repeat(10))
        );
        assert_eq!(text[4], "  نص إيجابي");
    }

    #[test]
    fn attachment_chip_depends_on_kind() {
        let image = Attachment::from_bytes(b"", "image/png", "a.png");
        let pdf = Attachment::from_bytes(b"", "application/pdf", "b.pdf");
        assert_eq!(attachment_chip(&image), "🖼 a.png (image/png)");
        assert_eq!(attachment_chip(&pdf), "📄 b.pdf (application/pdf)");
    }

    #[test]
    fn gauge_is_clamped() {
        assert_eq!(confidence_gauge(1.7, 4), ("████".to_string(), String::new()));
        assert_eq!(confidence_gauge(-1.0, 4), (String::new(), "░░░░".to_string()));
    }

    #[test]
    fn wrapping_breaks_at_words() {
        // Character counting would say two rows; word wrap needs three.
        let rows = wrap_lines(vec![Line::from("aaaa bbbb cc")], 6);
        assert_eq!(plain(&rows), ["aaaa ", "bbbb ", "cc"]);
    }

    #[test]
    fn overlong_words_are_split() {
        let rows = wrap_lines(vec![Line::from("x abcdefghij")], 4);
        assert_eq!(plain(&rows), ["x ", "abcd", "efgh", "ij"]);
    }

    #[test]
    fn short_and_empty_lines_keep_one_row() {
        let lines = vec![Line::from("  😊 ok"), Line::from("")];
        let rows = wrap_lines(lines, 40);
        assert_eq!(plain(&rows), ["  😊 ok", ""]);
    }

    #[test]
    fn wrapped_rows_keep_span_styles() {
        let theme = Theme::dark_default();
        let line = Line::from(vec![
            Span::raw("plain "),
            Span::styled("styled words", theme.title_style),
        ]);
        let rows = wrap_lines(vec![line], 8);
        assert_eq!(plain(&rows), ["plain ", "styled ", "words"]);
        assert!(rows[2].spans.iter().all(|s| s.style == theme.title_style));
    }

    #[test]
    fn help_lines_end_with_spacer() {
        let lines = help_lines("one\ntwo", &Theme::dark_default());
        assert_eq!(plain(&lines), ["one", "two", ""]);
    }
}
