//! Application context and session modes
//!
//! [`AppContext`] owns everything a session needs: configuration, storage
//! and both managers, which share one relay client and renderer. Commands
//! receive it explicitly instead of reaching for globals.

use crate::client::{RelayApi, RelayClient};
use crate::config::Config;
use crate::conversation::ConversationManager;
use crate::error::Result;
use crate::render::Renderer;
use crate::status::StatusReporter;
use crate::storage::Storage;
use crate::todo::TodoManager;

use colored::Colorize;
use std::fmt;
use std::sync::Arc;

/// Interactive session mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Questions go to the active conversation
    #[default]
    Qa,

    /// Lines manage the todo list
    Todo,
}

impl fmt::Display for AppMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Qa => write!(f, "Q&A"),
            Self::Todo => write!(f, "TODO"),
        }
    }
}

impl AppMode {
    /// Parse a mode name
    ///
    /// # Examples
    ///
    /// ```
    /// use studyqa::app::AppMode;
    ///
    /// assert_eq!(AppMode::parse_str("todo").unwrap(), AppMode::Todo);
    /// assert_eq!(AppMode::parse_str("QA").unwrap(), AppMode::Qa);
    /// assert!(AppMode::parse_str("write").is_err());
    /// ```
    pub fn parse_str(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "qa" | "q&a" | "ask" => Ok(Self::Qa),
            "todo" | "todos" | "plan" => Ok(Self::Todo),
            other => Err(format!("Unknown mode: {}", other)),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Qa => "Ask study questions in the active conversation",
            Self::Todo => "Add todos with '<HH:MM> <task>' and plan your day",
        }
    }

    pub fn colored_tag(&self) -> String {
        match self {
            Self::Qa => format!("[{}]", "Q&A".cyan()),
            Self::Todo => format!("[{}]", "TODO".purple()),
        }
    }
}

/// Everything a CLI command or interactive session works with
pub struct AppContext {
    pub config: Config,
    pub storage: Storage,
    pub conversations: ConversationManager,
    pub todos: TodoManager,
    mode: AppMode,
}

impl AppContext {
    /// Build the context from configuration
    ///
    /// Opens the configured storage and creates an HTTP relay client.
    ///
    /// # Errors
    ///
    /// Returns an error when the database cannot be opened or the HTTP
    /// client cannot be built
    pub fn new(config: Config) -> Result<Self> {
        let storage = Storage::open(&config.storage)?;
        let relay: Arc<dyn RelayApi> = Arc::new(RelayClient::new(&config.client)?);
        tracing::debug!(relay = %config.client.base_url, "Created application context");
        Ok(Self::with_parts(config, storage, relay))
    }

    /// Build the context from existing parts
    pub fn with_parts(config: Config, storage: Storage, relay: Arc<dyn RelayApi>) -> Self {
        let renderer = Renderer::new(&config.render);
        let conversations =
            ConversationManager::load(storage.clone(), Arc::clone(&relay), renderer.clone());
        let todos = TodoManager::load(storage.clone(), relay, renderer);

        Self {
            config,
            storage,
            conversations,
            todos,
            mode: AppMode::default(),
        }
    }

    /// Send status changes from both managers to `reporter`
    pub fn set_status_reporter(&mut self, reporter: StatusReporter) {
        self.conversations.set_status_reporter(Arc::clone(&reporter));
        self.todos.set_status_reporter(reporter);
    }

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    /// Switch mode, returning the previous one
    pub fn switch_mode(&mut self, mode: AppMode) -> AppMode {
        std::mem::replace(&mut self.mode, mode)
    }

    /// Prompt like `[Q&A] >> `
    pub fn format_prompt(&self) -> String {
        format!("[{}] >> ", self.mode)
    }

    pub fn format_colored_prompt(&self) -> String {
        format!("{} >> ", self.mode.colored_tag())
    }

    /// Multi-line summary shown by `/status`
    pub fn status(&self) -> String {
        let active = self.conversations.active();
        let document = self
            .conversations
            .document()
            .map(|d| d.name.as_str())
            .unwrap_or("none");
        let status = match self.mode {
            AppMode::Qa => self.conversations.status(),
            AppMode::Todo => self.todos.status(),
        };

        format!(
            "Mode: {} ({})\nConversation: {} ({} messages)\nDocument: {}\nTodos: {}\nStatus: {}",
            self.mode,
            self.mode.description(),
            active.title,
            active.messages.len(),
            document,
            self.todos.items().len(),
            status
        )
    }
}
