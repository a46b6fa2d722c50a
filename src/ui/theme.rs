use crate::core::message::SentimentCategory;
use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub model_prefix_style: Style,
    pub model_text_style: Style,
    pub help_style: Style,
    pub meta_style: Style,
    pub attachment_style: Style,

    // Sentiment widget
    pub positive_style: Style,
    pub negative_style: Style,
    pub neutral_style: Style,
    pub gauge_empty_style: Style,
    pub explanation_style: Style,

    // Chrome
    pub title_style: Style,
    pub welcome_style: Style,
    pub thinking_style: Style,
    pub status_style: Style,
    pub input_border_style: Style,
    pub input_disabled_border_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            model_prefix_style: Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
            model_text_style: Style::default().fg(Color::White),
            help_style: Style::default().fg(Color::Gray),
            meta_style: Style::default().fg(Color::DarkGray),
            attachment_style: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::ITALIC),

            positive_style: Style::default().fg(Color::LightGreen),
            negative_style: Style::default().fg(Color::LightRed),
            neutral_style: Style::default().fg(Color::Yellow),
            gauge_empty_style: Style::default().fg(Color::DarkGray),
            explanation_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),

            title_style: Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
            welcome_style: Style::default().fg(Color::Gray),
            thinking_style: Style::default().fg(Color::LightMagenta),
            status_style: Style::default().fg(Color::Yellow),
            input_border_style: Style::default().fg(Color::Gray),
            input_disabled_border_style: Style::default().fg(Color::DarkGray),
        }
    }

    pub fn sentiment_style(&self, category: SentimentCategory) -> Style {
        match category {
            SentimentCategory::Positive => self.positive_style,
            SentimentCategory::Negative => self.negative_style,
            SentimentCategory::Neutral => self.neutral_style,
        }
    }
}
