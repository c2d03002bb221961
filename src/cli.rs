//! Command-line interface definition for StudyQA
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the relay server, Q&A conversations and the
//! todo day-planner.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// StudyQA - study assistant backed by a chat-completion relay
///
/// Ask study questions, summarize documents, turn answers into diagrams
/// and plan your day from a todo list.
#[derive(Parser, Debug, Clone)]
#[command(name = "studyqa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Override the storage database path
    #[arg(long, env = "STUDYQA_STORAGE")]
    pub storage_path: Option<String>,

    /// Override the relay server URL used by client commands
    #[arg(long)]
    pub relay_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for StudyQA
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the relay server
    Serve {
        /// Interface to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Start an interactive session
    Chat {
        /// Attach a document (PDF, text or markdown) to the session
        #[arg(short, long)]
        document: Option<PathBuf>,

        /// Start in todo mode instead of Q&A mode
        #[arg(long)]
        todo: bool,
    },

    /// Ask a single question in the active conversation
    Ask {
        /// The question to ask
        question: String,

        /// Attach a document as context for this question
        #[arg(short, long)]
        document: Option<PathBuf>,
    },

    /// Manage conversations
    Conversations {
        #[command(subcommand)]
        command: ConversationCommand,
    },

    /// Export the active conversation to PDF
    Export {
        /// Output file (defaults to StudyQA_<date>_<id>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Turn the latest answer into an ASCII diagram
    Diagram,

    /// Summarize a document into the active conversation
    Summarize {
        /// Path to a PDF, text or markdown file
        path: PathBuf,
    },

    /// Manage todos and generate day plans
    Todo {
        #[command(subcommand)]
        command: TodoCommand,
    },
}

/// Conversation management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConversationCommand {
    /// List conversations, favorites first
    List,

    /// Show the messages of a conversation (active one by default)
    Show {
        /// Conversation ID or 8-character prefix
        id: Option<String>,
    },

    /// Start a new conversation
    New,

    /// Make a conversation active
    Switch {
        /// Conversation ID or 8-character prefix
        id: String,
    },

    /// Toggle the favorite flag (active conversation by default)
    Favorite {
        /// Conversation ID or 8-character prefix
        id: Option<String>,
    },

    /// Delete a conversation
    Delete {
        /// Conversation ID or 8-character prefix
        id: String,
    },
}

/// Todo management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TodoCommand {
    /// List todos
    List,

    /// Add a todo
    Add {
        /// Due time (HH:MM)
        time: String,

        /// Task description
        #[arg(num_args = 1.., trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Replace the text and due time of a todo
    Edit {
        /// Todo ID or 8-character prefix
        id: String,

        /// Due time (HH:MM)
        time: String,

        /// Task description
        #[arg(num_args = 1.., trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Flip the completion flag of a todo
    Toggle {
        /// Todo ID or 8-character prefix
        id: String,
    },

    /// Remove a todo
    Delete {
        /// Todo ID or 8-character prefix
        id: String,
    },

    /// Remove every todo
    Clear,

    /// Generate a day plan from the current todos
    Plan,

    /// Show previously generated plans
    History {
        /// Show the full plan of the N-th most recent entry (1 = latest)
        #[arg(short, long)]
        show: Option<usize>,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            json_logs: false,
            storage_path: None,
            relay_url: None,
            command: Commands::Chat {
                document: None,
                todo: false,
            },
        }
    }
}
