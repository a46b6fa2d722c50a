use super::CommandResult;
use crate::core::app::App;

pub type CommandHandler = fn(&mut App, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show available commands and keys.",
        handler: super::handle_help,
    },
    Command {
        name: "attach",
        usage: "/attach <path>",
        help: "Stage an image, PDF or text file for the next message.",
        handler: super::handle_attach,
    },
    Command {
        name: "detach",
        usage: "/detach",
        help: "Drop the staged attachment.",
        handler: super::handle_detach,
    },
    Command {
        name: "clear",
        usage: "/clear",
        help: "Start a new conversation.",
        handler: super::handle_clear,
    },
    Command {
        name: "log",
        usage: "/log [file]",
        help: "Toggle transcript logging or set the log file path.",
        handler: super::handle_log,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Leave the chat.",
        handler: super::handle_quit,
    },
];
