//! Plain-text transcript logging (`--log`, `/log`).

use crate::core::message::ChatMessage;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct LoggingState {
    file_path: Option<PathBuf>,
    is_active: bool,
}

impl LoggingState {
    pub fn new(log_file: Option<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut logging = LoggingState {
            file_path: None,
            is_active: false,
        };
        if let Some(path) = log_file {
            logging.set_log_file(path)?;
        }
        Ok(logging)
    }

    pub fn set_log_file(&mut self, path: PathBuf) -> Result<String, Box<dyn std::error::Error>> {
        // Test if we can create/write to the file
        test_file_access(&path)?;

        let message = format!("Logging enabled to: {}", path.display());
        self.file_path = Some(path);
        self.is_active = true;
        Ok(message)
    }

    pub fn toggle_logging(&mut self) -> Result<String, Box<dyn std::error::Error>> {
        match &self.file_path {
            Some(path) => {
                self.is_active = !self.is_active;
                if self.is_active {
                    Ok(format!("Logging resumed to: {}", path.display()))
                } else {
                    Ok(format!("Logging paused (file: {})", path.display()))
                }
            }
            None => {
                Err("No log file specified. Use /log <filename> to enable logging first.".into())
            }
        }
    }

    pub fn log_message(&self, message: &ChatMessage) -> Result<(), Box<dyn std::error::Error>> {
        let Some(file_path) = self.file_path.as_ref().filter(|_| self.is_active) else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::new(file);

        let time = message.timestamp.format("%H:%M");
        writeln!(writer, "[{time}] {}:", message.role.display_label())?;
        if let Some(attachment) = &message.attachment {
            writeln!(writer, "(attachment: {} {})", attachment.name, attachment.media_type)?;
        }
        for line in message.text.lines() {
            writeln!(writer, "{line}")?;
        }
        if let Some(result) = &message.sentiment_result {
            writeln!(
                writer,
                "{} {} ({}%)",
                result.emoji,
                result.sentiment,
                result.confidence_percent()
            )?;
        }

        // Empty line between messages, matching the screen
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn get_status_string(&self) -> String {
        let name = |path: &Path| {
            path.file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned()
        };
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!("active ({})", name(path)),
            (Some(path), false) => format!("paused ({})", name(path)),
        }
    }
}

fn test_file_access(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::{SentimentCategory, SentimentResult};
    use tempfile::TempDir;

    #[test]
    fn disabled_logging_writes_nothing() {
        let logging = LoggingState::new(None).unwrap();
        assert_eq!(logging.get_status_string(), "disabled");
        logging
            .log_message(&ChatMessage::user("hello", None))
            .unwrap();
    }

    #[test]
    fn messages_are_appended_with_result_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat.log");
        let logging = LoggingState::new(Some(path.clone())).unwrap();
        assert!(logging.is_active());

        logging
            .log_message(&ChatMessage::user("يوم جميل", None))
            .unwrap();
        logging
            .log_message(&ChatMessage::model(
                "نص إيجابي",
                Some(SentimentResult {
                    sentiment: SentimentCategory::Positive,
                    confidence: 0.9,
                    emoji: "😊".to_string(),
                    explanation: "نص إيجابي".to_string(),
                }),
            ))
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("You:\nيوم جميل\n\n"));
        assert!(contents.contains("Oracle AI:\nنص إيجابي\n😊 إيجابي (90%)\n"));
    }

    #[test]
    fn toggle_pauses_and_resumes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat.log");
        let mut logging = LoggingState::new(None).unwrap();
        assert!(logging.toggle_logging().is_err());

        logging.set_log_file(path.clone()).unwrap();
        let paused = logging.toggle_logging().unwrap();
        assert!(paused.starts_with("Logging paused"));
        assert_eq!(logging.get_status_string(), "paused (chat.log)");

        logging.log_message(&ChatMessage::user("hidden", None)).unwrap();
        assert!(!std::fs::read_to_string(&path).unwrap().contains("hidden"));

        logging.toggle_logging().unwrap();
        assert_eq!(logging.get_status_string(), "active (chat.log)");
    }
}
