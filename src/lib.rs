//! StudyQA - study assistant library
//!
//! This library provides the pieces behind the `studyqa` binary: a relay
//! server in front of an OpenAI-compatible chat-completion API, and the
//! client side that keeps conversations and a todo planner on disk.
//!
//! # Architecture
//!
//! - `relay`: axum server exposing `/ask`, `/diagramise` and `/plan`
//! - `providers`: upstream chat-completion provider abstraction
//! - `client`: `RelayApi` trait and its HTTP implementation
//! - `conversation` / `todo`: managers driving the Q&A and planner flows
//! - `storage`: key-value persistence (SQLite) and the typed adapter
//! - `render`: typed-markdown rendering
//! - `app`, `commands`, `cli`: session context and command handlers
//! - `config`, `error`: configuration and error types
//!
//! # Example
//!
//! ```no_run
//! use studyqa::{AppContext, Config};
//! use studyqa::render::TerminalTarget;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let mut app = AppContext::new(config)?;
//!     let mut target = TerminalTarget::new();
//!     let _ = app.conversations.ask("What is osmosis?", &mut target).await;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod document;
pub mod error;
pub mod export;
pub mod prompts;
pub mod providers;
pub mod relay;
pub mod render;
pub mod status;
pub mod storage;
pub mod todo;

// Re-export commonly used types
pub use app::{AppContext, AppMode};
pub use client::{RelayApi, RelayClient, RelayReply};
pub use config::Config;
pub use conversation::ConversationManager;
pub use error::{InputError, Result, StudyError};
pub use storage::Storage;
pub use todo::TodoManager;

#[cfg(test)]
pub mod test_utils;
