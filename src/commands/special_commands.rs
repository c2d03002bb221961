//! Special commands parser for interactive sessions
//!
//! Special commands manage conversations, documents and the todo planner
//! without sending anything to the relay. Commands are prefixed with `/`
//! and their names are case-insensitive; arguments keep their case.

use crate::app::AppMode;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands available during an interactive session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start a new conversation
    NewConversation,

    /// List conversations, favorites first
    ListConversations,

    /// Make a conversation active (ID or prefix)
    SwitchConversation(String),

    /// Toggle the favorite flag of the active conversation
    Favorite,

    /// Delete a conversation (ID or prefix)
    DeleteConversation(String),

    /// Export the active conversation, optionally to a given path
    Export(Option<PathBuf>),

    /// Diagram the latest answer
    Diagram,

    /// Summarize a document into the active conversation
    Summarize(PathBuf),

    /// Attach a document as context for following questions
    Attach(PathBuf),

    /// Drop the attached document
    Detach,

    /// Switch between Q&A and todo mode
    SwitchMode(AppMode),

    /// Generate a day plan from the todo list
    Plan,

    /// Show session status
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    None,
}

fn missing(command: &str, usage: &str) -> CommandError {
    CommandError::MissingArgument {
        command: command.to_string(),
        usage: usage.to_string(),
    }
}

fn required_arg<'a>(arg: &'a str, command: &str, usage: &str) -> Result<&'a str, CommandError> {
    if arg.is_empty() {
        Err(missing(command, usage))
    } else {
        Ok(arg)
    }
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for unrecognised `/` input,
/// `CommandError::MissingArgument` when a required argument is absent and
/// `CommandError::UnsupportedArgument` for an invalid argument.
///
/// # Examples
///
/// ```
/// use studyqa::app::AppMode;
/// use studyqa::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/mode todo").unwrap();
/// assert_eq!(cmd, SpecialCommand::SwitchMode(AppMode::Todo));
///
/// let cmd = parse_special_command("what is osmosis?").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if lower == "exit" || lower == "quit" {
        return Ok(SpecialCommand::Exit);
    }
    if !trimmed.starts_with('/') {
        return Ok(SpecialCommand::None);
    }

    let (name, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match name.as_str() {
        "/new" => Ok(SpecialCommand::NewConversation),
        "/list" | "/history" => Ok(SpecialCommand::ListConversations),
        "/switch" => required_arg(arg, "/switch", "/switch <id>")
            .map(|id| SpecialCommand::SwitchConversation(id.to_string())),
        "/fav" | "/favorite" | "/bookmark" => Ok(SpecialCommand::Favorite),
        "/delete" => required_arg(arg, "/delete", "/delete <id>")
            .map(|id| SpecialCommand::DeleteConversation(id.to_string())),
        "/export" => Ok(SpecialCommand::Export(
            (!arg.is_empty()).then(|| PathBuf::from(arg)),
        )),
        "/diagram" | "/memify" => Ok(SpecialCommand::Diagram),
        "/summarize" => required_arg(arg, "/summarize", "/summarize <path>")
            .map(|path| SpecialCommand::Summarize(PathBuf::from(path))),
        "/attach" => required_arg(arg, "/attach", "/attach <path>")
            .map(|path| SpecialCommand::Attach(PathBuf::from(path))),
        "/detach" => Ok(SpecialCommand::Detach),
        "/mode" => {
            let arg = required_arg(arg, "/mode", "/mode <qa|todo>")?;
            AppMode::parse_str(arg)
                .map(SpecialCommand::SwitchMode)
                .map_err(|_| CommandError::UnsupportedArgument {
                    command: "/mode".to_string(),
                    arg: arg.to_string(),
                })
        }
        "/qa" => Ok(SpecialCommand::SwitchMode(AppMode::Qa)),
        "/todo" => Ok(SpecialCommand::SwitchMode(AppMode::Todo)),
        "/plan" => Ok(SpecialCommand::Plan),
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(name)),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Sessions
=========================================

CONVERSATIONS:
  /new              - Start a new conversation
  /list             - List conversations (favorites first)
  /switch <id>      - Switch to a conversation (ID or prefix)
  /fav              - Toggle favorite on the active conversation
  /delete <id>      - Delete a conversation
  /export [path]    - Export the active conversation to PDF

STUDY TOOLS:
  /diagram          - Turn the latest answer into an ASCII diagram
  /summarize <path> - Summarize a PDF, text or markdown file
  /attach <path>    - Use a document as context for following questions
  /detach           - Stop using the attached document

TODO PLANNER:
  /mode <qa|todo>   - Switch session mode
  /qa, /todo        - Shorthand for /mode qa and /mode todo
  /plan             - Generate a day plan from your todos
  <HH:MM> <task>    - In todo mode, add a todo

SESSION:
  /status           - Show mode, conversation and todo status
  /help             - Show this help message
  exit, quit        - Leave the session
"#
    );
}
