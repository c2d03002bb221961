//! Error types for StudyQA
//!
//! This module defines the error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for StudyQA operations
///
/// Covers configuration loading, storage access, the upstream
/// chat-completion provider and calls to the relay server.
#[derive(Error, Debug)]
pub enum StudyError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upstream chat-completion provider errors
    #[error("Provider error: {0}")]
    Provider(String),

    /// Relay server call failed (non-OK status or transport failure)
    #[error("Relay error: {0}")]
    Relay(String),

    /// Missing credentials for the upstream provider
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Document loading or text extraction errors
    #[error("Document error: {0}")]
    Document(String),

    /// PDF export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Key-value storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// User-input validation failures
///
/// These never reach the network. The display text is the status line shown
/// to the user, so callers can surface `err.to_string()` directly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Please type a question first.")]
    EmptyQuestion,

    #[error("Please add a todo first.")]
    EmptyTodoText,

    #[error("Please select a due time.")]
    EmptyDueTime,

    #[error("Please enter both task and time.")]
    IncompleteEdit,

    #[error("Add at least one todo to plan your day.")]
    NothingToPlan,

    #[error("Please get an answer first before diagramming.")]
    NothingToDiagram,

    #[error("Please start a conversation before exporting.")]
    NothingToExport,
}

/// Result type alias for StudyQA operations
///
/// Uses `anyhow::Error` so that context can be attached while
/// `StudyError` remains the typed root of most failures.
pub type Result<T> = anyhow::Result<T>;

/// Text to show the user for a failure
///
/// Relay, provider and document errors carry a message written for the
/// user, so the variant prefix is dropped for those.
pub fn user_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<StudyError>() {
        Some(StudyError::Relay(message))
        | Some(StudyError::Provider(message))
        | Some(StudyError::Document(message)) => message.clone(),
        _ => err.to_string(),
    }
}
