mod registry;

pub use registry::{all_commands, CommandInvocation};

use crate::core::app::App;
use std::path::PathBuf;

#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    ProcessAsMessage(String),
    Exit,
}

pub fn process_input(app: &mut App, input: &str) -> CommandResult {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsMessage(input.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, char::is_whitespace);
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    if let Some(command) = registry::find_command(command_name) {
        let invocation = CommandInvocation {
            input: trimmed,
            args,
        };
        (command.handler)(app, invocation)
    } else {
        CommandResult::ProcessAsMessage(input.to_string())
    }
}

pub fn help_text() -> String {
    let mut help = String::from("Commands:\n");
    for command in all_commands() {
        help.push_str(&format!("  {:<14} {}\n", command.usage, command.help));
    }
    help.push_str(
        "Keys:\n  Enter          Send\n  Alt+Enter      New line\n  Ctrl+L         Clear the conversation\n  Up/Down/PgUp/PgDn  Scroll\n  Esc            Hide this help\n  Ctrl+C         Quit",
    );
    help
}

pub(super) fn handle_help(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    app.ui.help = Some(help_text());
    app.ui.auto_scroll = true;
    CommandResult::Continue
}

/// Strip one pair of matching quotes, as terminals add them when a file is
/// dropped onto the window.
pub(crate) fn unquote(arg: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = arg
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    arg
}

pub(crate) fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

pub(super) fn handle_attach(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let arg = unquote(invocation.args);
    if arg.is_empty() {
        app.ui.set_status("Usage: /attach <path>");
        return CommandResult::Continue;
    }
    app.stage_attachment(&expand_home(arg));
    CommandResult::Continue
}

pub(super) fn handle_detach(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    if app.ui.staged.is_none() {
        app.ui.set_status("No attachment staged");
    } else {
        app.clear_staged();
    }
    CommandResult::Continue
}

pub(super) fn handle_clear(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    app.reset();
    CommandResult::Continue
}

pub(super) fn handle_log(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let result = if invocation.args.is_empty() {
        app.logging.toggle_logging()
    } else {
        app.logging
            .set_log_file(expand_home(unquote(invocation.args)))
    };

    match result {
        Ok(message) => app.ui.set_status(message),
        Err(e) => app.ui.set_status(format!("Log error: {e}")),
    }
    CommandResult::Continue
}

pub(super) fn handle_quit(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    app.ui.exit_requested = true;
    CommandResult::Exit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{create_test_app, write_temp_file};
    use tempfile::TempDir;

    #[test]
    fn plain_text_is_a_message() {
        let mut app = create_test_app("ok");
        assert_eq!(
            process_input(&mut app, "hello"),
            CommandResult::ProcessAsMessage("hello".to_string())
        );
        assert_eq!(
            process_input(&mut app, "/unknown thing"),
            CommandResult::ProcessAsMessage("/unknown thing".to_string())
        );
    }

    #[test]
    fn attach_accepts_quoted_paths() {
        let dir = TempDir::new().unwrap();
        let path = write_temp_file(&dir, "my photo.jpg", b"\xff\xd8");
        let mut app = create_test_app("ok");

        let input = format!("/attach '{}'", path.display());
        assert_eq!(process_input(&mut app, &input), CommandResult::Continue);
        assert_eq!(app.ui.staged.as_ref().unwrap().name, "my photo.jpg");

        assert_eq!(process_input(&mut app, "/detach"), CommandResult::Continue);
        assert!(app.ui.staged.is_none());
    }

    #[test]
    fn attach_without_path_shows_usage() {
        let mut app = create_test_app("ok");
        process_input(&mut app, "/attach");
        assert_eq!(app.ui.status.as_deref(), Some("Usage: /attach <path>"));
        assert!(app.ui.staged.is_none());
    }

    #[tokio::test]
    async fn clear_resets_conversation() {
        let mut app = create_test_app("ok");
        app.session.send("something", None).await;
        assert_eq!(app.session.conversation().len(), 2);
        process_input(&mut app, "/help");
        assert_eq!(process_input(&mut app, "/CLEAR"), CommandResult::Continue);
        assert!(app.session.conversation().is_empty());
        assert!(app.ui.help.is_none());
    }

    #[test]
    fn help_is_shown_without_touching_the_conversation() {
        let mut app = create_test_app("ok");
        process_input(&mut app, "/help");
        assert!(app.session.conversation().is_empty());
        let help = app.ui.help.as_deref().unwrap();
        for command in all_commands() {
            assert!(help.contains(command.usage));
        }
    }

    #[test]
    fn log_command_sets_file() {
        let dir = TempDir::new().unwrap();
        let mut app = create_test_app("ok");
        let input = format!("/log {}", dir.path().join("t.log").display());
        process_input(&mut app, &input);
        assert!(app.logging.is_active());
        assert!(app
            .ui
            .status
            .as_deref()
            .unwrap()
            .starts_with("Logging enabled"));
    }

    #[test]
    fn quit_requests_exit() {
        let mut app = create_test_app("ok");
        assert_eq!(process_input(&mut app, "/quit"), CommandResult::Exit);
        assert!(app.ui.exit_requested);
    }
}
