/*!
Command handlers for the CLI

This module provides the handlers invoked by the CLI entrypoint:

- `chat`          - Interactive session (Q&A and todo modes)
- `conversations` - One-shot conversation management
- `export`        - Conversation export to PDF
- `todo`          - One-shot todo management and planning

`studyqa serve` is handled by [`crate::relay::serve`].
*/

use crate::app::{AppContext, AppMode};
use crate::cli::{Commands, ConversationCommand, TodoCommand};
use crate::config::Config;
use crate::error::{Result, StudyError};
use crate::render::TerminalTarget;
use crate::status::{Status, StatusReporter};

use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// Table listings
pub mod history;

// Special commands parser for interactive sessions
pub mod special_commands;

/// Run a parsed CLI command
///
/// # Errors
///
/// Returns configuration, storage and server errors. Failures inside a
/// conversation or todo flow are reported through the status line instead.
pub async fn dispatch(command: Commands, config: Config) -> Result<()> {
    if let Commands::Serve { .. } = command {
        return crate::relay::serve(&config).await;
    }

    let mut app = AppContext::new(config)?;
    app.set_status_reporter(terminal_status_reporter());

    match command {
        Commands::Serve { .. } => Ok(()),
        Commands::Chat { document, todo } => chat::run_chat(app, document, todo).await,
        Commands::Ask { question, document } => {
            if let Some(path) = document {
                attach_document(&mut app, &path)?;
            }
            let mut target = TerminalTarget::new();
            // Blank input is reported on the status line.
            let _ = app.conversations.ask(&question, &mut target).await;
            Ok(())
        }
        Commands::Conversations { command } => conversations::handle(&mut app, command),
        Commands::Export { output } => {
            let path = export::export_conversation(&mut app, output)?;
            println!("{}", format!("Exported to {}", path.display()).green());
            Ok(())
        }
        Commands::Diagram => {
            let mut target = TerminalTarget::new();
            let _ = app.conversations.diagram(&mut target).await;
            Ok(())
        }
        Commands::Summarize { path } => {
            let mut target = TerminalTarget::new();
            app.conversations.summarize(&path, &mut target).await;
            Ok(())
        }
        Commands::Todo { command } => todo::handle(&mut app, command).await,
    }
}

/// Status reporter that prints to stderr
///
/// In-flight statuses are cyan, settled ones dimmed.
pub fn terminal_status_reporter() -> StatusReporter {
    Arc::new(|status: &Status| {
        if status.text.is_empty() {
            return;
        }
        if status.loading {
            eprintln!("{}", status.text.cyan());
        } else {
            eprintln!("{}", status.text.dimmed());
        }
    })
}

/// Load a document and attach it to the conversation manager
fn attach_document(app: &mut AppContext, path: &Path) -> Result<()> {
    let document = crate::document::load_document(path)?;
    println!(
        "{}",
        format!(
            "Attached {} ({} characters)",
            document.name,
            document.text.chars().count()
        )
        .green()
    );
    app.conversations.attach_document(document);
    Ok(())
}

fn resolve_conversation(app: &AppContext, id: &str) -> Result<String> {
    app.conversations
        .resolve_id(id)
        .ok_or_else(|| StudyError::Storage(format!("Conversation not found: {}", id)).into())
}

fn resolve_todo(app: &AppContext, id: &str) -> Result<String> {
    app.todos
        .resolve_id(id)
        .ok_or_else(|| StudyError::Storage(format!("Todo not found: {}", id)).into())
}

// Interactive session handler
pub mod chat {
    //! Interactive session
    //!
    //! Reads lines with rustyline. In Q&A mode a line is a question for the
    //! active conversation; in todo mode `<HH:MM> <task>` adds a todo. Each
    //! request is awaited before the next line is read.

    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::*;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start an interactive session
    pub async fn run_chat(
        mut app: AppContext,
        document: Option<PathBuf>,
        todo_mode: bool,
    ) -> Result<()> {
        tracing::info!("Starting interactive session");

        if todo_mode {
            app.switch_mode(AppMode::Todo);
        }
        if let Some(path) = document {
            if let Err(e) = attach_document(&mut app, &path) {
                eprintln!("{}", crate::error::user_message(&e).red());
            }
        }

        let mut rl = DefaultEditor::new()?;
        print_welcome_banner(&app);

        loop {
            let prompt = app.format_colored_prompt();
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(trimmed);

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => handle_line(&mut app, trimmed).await,
                        other => handle_special(&mut app, other).await,
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        Ok(())
    }

    async fn handle_line(app: &mut AppContext, line: &str) {
        let mut target = TerminalTarget::new();
        match app.mode() {
            AppMode::Qa => {
                let _ = app.conversations.ask(line, &mut target).await;
            }
            AppMode::Todo => match todo::parse_todo_line(line) {
                Some((time, text)) => {
                    if app.todos.add(&text, &time).is_ok() {
                        history::print_todos(app.todos.items());
                    }
                }
                None => println!(
                    "{}",
                    "Use '<HH:MM> <task>' to add a todo, /plan to plan or /qa to ask questions."
                        .yellow()
                ),
            },
        }
    }

    async fn handle_special(app: &mut AppContext, command: SpecialCommand) {
        let mut target = TerminalTarget::new();
        match command {
            SpecialCommand::NewConversation => {
                let id = app.conversations.new_query().id.clone();
                println!("{}", format!("Started conversation {}", &id[..8.min(id.len())]).green());
            }
            SpecialCommand::ListConversations => history::print_conversations(&app.conversations),
            SpecialCommand::SwitchConversation(id) => match resolve_conversation(app, &id) {
                Ok(id) => {
                    app.conversations.set_active(&id);
                    history::print_conversation(app.conversations.active());
                }
                Err(e) => eprintln!("{}", e.to_string().red()),
            },
            SpecialCommand::Favorite => {
                let favorite = app.conversations.bookmark();
                let text = if favorite {
                    "Added to favorites."
                } else {
                    "Removed from favorites."
                };
                println!("{}", text.green());
            }
            SpecialCommand::DeleteConversation(id) => match resolve_conversation(app, &id) {
                Ok(id) => {
                    app.conversations.delete(&id);
                    println!("{}", format!("Deleted conversation {}", id).green());
                }
                Err(e) => eprintln!("{}", e.to_string().red()),
            },
            SpecialCommand::Export(output) => match export::export_conversation(app, output) {
                Ok(path) => println!("{}", format!("Exported to {}", path.display()).green()),
                Err(e) => eprintln!("{}", e.to_string().red()),
            },
            SpecialCommand::Diagram => {
                let _ = app.conversations.diagram(&mut target).await;
            }
            SpecialCommand::Summarize(path) => {
                app.conversations.summarize(&path, &mut target).await;
            }
            SpecialCommand::Attach(path) => {
                if let Err(e) = attach_document(app, &path) {
                    eprintln!("{}", crate::error::user_message(&e).red());
                }
            }
            SpecialCommand::Detach => match app.conversations.detach_document() {
                Some(doc) => println!("{}", format!("Detached {}", doc.name).green()),
                None => println!("{}", "No document attached.".yellow()),
            },
            SpecialCommand::SwitchMode(mode) => {
                let old = app.switch_mode(mode);
                println!("Switched from {} to {} mode\n", old, mode);
                if mode == AppMode::Todo {
                    history::print_todos(app.todos.items());
                }
            }
            SpecialCommand::Plan => {
                let now = crate::todo::local_time_string();
                let _ = app.todos.plan(&now, &mut target).await;
            }
            SpecialCommand::ShowStatus => println!("\n{}\n", app.status()),
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit | SpecialCommand::None => {}
        }
    }

    fn print_welcome_banner(app: &AppContext) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║              StudyQA Interactive Session                     ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Mode:   {} ({})", app.mode().colored_tag(), app.mode().description());
        println!("Chat:   {}", app.conversations.active().title);
        if let Some(doc) = app.conversations.document() {
            println!("File:   {}", doc.name);
        }
        println!("\nType '/help' for commands, 'exit' to leave.\n");
    }
}

// Conversation management
pub mod conversations {
    use super::*;

    pub fn handle(app: &mut AppContext, command: ConversationCommand) -> Result<()> {
        match command {
            ConversationCommand::List => history::print_conversations(&app.conversations),
            ConversationCommand::Show { id } => {
                let id = match id {
                    Some(id) => resolve_conversation(app, &id)?,
                    None => app.conversations.active_id().to_string(),
                };
                if let Some(convo) = app.conversations.get(&id) {
                    history::print_conversation(convo);
                }
            }
            ConversationCommand::New => {
                let id = app.conversations.new_query().id.clone();
                println!("{}", format!("Started conversation {}", id).green());
            }
            ConversationCommand::Switch { id } => {
                let id = resolve_conversation(app, &id)?;
                app.conversations.set_active(&id);
                println!("{}", format!("Active conversation: {}", id).green());
            }
            ConversationCommand::Favorite { id } => {
                let id = match id {
                    Some(id) => resolve_conversation(app, &id)?,
                    None => app.conversations.active_id().to_string(),
                };
                let favorite = app.conversations.toggle_favorite(&id).unwrap_or(false);
                let text = if favorite {
                    "Added to favorites."
                } else {
                    "Removed from favorites."
                };
                println!("{}", text.green());
            }
            ConversationCommand::Delete { id } => {
                let id = resolve_conversation(app, &id)?;
                app.conversations.delete(&id);
                println!("{}", format!("Deleted conversation {}", id).green());
            }
        }
        Ok(())
    }
}

// Conversation export
pub mod export {
    //! PDF export of the active conversation

    use super::*;
    use crate::conversation::ConversationManager;
    use crate::error::InputError;
    use chrono::{DateTime, Local};

    pub const EXPORT_SUCCESS: &str = "PDF exported successfully!";

    /// PDF bytes for the active conversation
    ///
    /// # Errors
    ///
    /// `InputError::NothingToExport` when the conversation has no text
    pub fn export_document(
        manager: &ConversationManager,
        generated: DateTime<Local>,
    ) -> Result<Vec<u8>> {
        let text = manager.export_text();
        if text.trim().is_empty() {
            return Err(InputError::NothingToExport.into());
        }
        crate::export::render_pdf(&text, generated)
    }

    /// Default file name: `StudyQA_<YYYYMMDD>_<first 5 ID characters>.pdf`
    pub fn export_file_name(conversation_id: &str, generated: DateTime<Local>) -> String {
        let suffix: String = conversation_id.chars().take(5).collect();
        format!("StudyQA_{}_{}.pdf", generated.format("%Y%m%d"), suffix)
    }

    /// Write the active conversation to `output` or the default file name
    ///
    /// Returns the path written.
    pub fn export_conversation(app: &mut AppContext, output: Option<PathBuf>) -> Result<PathBuf> {
        let now = Local::now();
        let pdf = export_document(&app.conversations, now)?;
        let path = output.unwrap_or_else(|| {
            PathBuf::from(export_file_name(app.conversations.active_id(), now))
        });

        std::fs::write(&path, pdf).map_err(StudyError::Io)?;
        app.conversations.set_status(EXPORT_SUCCESS);
        tracing::info!(path = %path.display(), "Exported conversation");
        Ok(path)
    }

}

// Todo management
pub mod todo {
    use super::*;
    use regex::Regex;

    /// Split `<HH:MM> <task>` into `(time, task)`
    ///
    /// # Examples
    ///
    /// ```
    /// use studyqa::commands::todo::parse_todo_line;
    ///
    /// assert_eq!(
    ///     parse_todo_line("9:30 Read chapter 3"),
    ///     Some(("09:30".to_string(), "Read chapter 3".to_string()))
    /// );
    /// assert_eq!(parse_todo_line("Read chapter 3"), None);
    /// ```
    pub fn parse_todo_line(line: &str) -> Option<(String, String)> {
        let re = Regex::new(r"^([01]?\d|2[0-3]):([0-5]\d)\s+(.+)$").ok()?;
        let caps = re.captures(line.trim())?;
        let hour: u32 = caps[1].parse().ok()?;
        let time = format!("{:02}:{}", hour, &caps[2]);
        Some((time, caps[3].trim().to_string()))
    }

    pub async fn handle(app: &mut AppContext, command: TodoCommand) -> Result<()> {
        match command {
            TodoCommand::List => history::print_todos(app.todos.items()),
            TodoCommand::Add { time, text } => {
                if app.todos.add(&text.join(" "), &time).is_ok() {
                    history::print_todos(app.todos.items());
                }
            }
            TodoCommand::Edit { id, time, text } => {
                let id = resolve_todo(app, &id)?;
                if let Ok(true) = app.todos.edit(&id, &text.join(" "), &time) {
                    history::print_todos(app.todos.items());
                }
            }
            TodoCommand::Toggle { id } => {
                let id = resolve_todo(app, &id)?;
                app.todos.toggle(&id);
            }
            TodoCommand::Delete { id } => {
                let id = resolve_todo(app, &id)?;
                app.todos.delete(&id);
            }
            TodoCommand::Clear => app.todos.clear(),
            TodoCommand::Plan => {
                let now = crate::todo::local_time_string();
                let mut target = TerminalTarget::new();
                let _ = app.todos.plan(&now, &mut target).await;
            }
            TodoCommand::History { show } => {
                history::print_todo_history(&app.todos.history(), show);
            }
        }
        Ok(())
    }

}
