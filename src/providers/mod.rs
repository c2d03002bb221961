//! Provider module for StudyQA
//!
//! This module contains the chat-completion provider abstraction and the
//! OpenAI-compatible implementation used by the relay server.

pub mod base;
pub mod openai;

pub use base::{ChatMessage, CompletionResponse, Provider, TokenUsage};
pub use openai::OpenAiProvider;

use crate::config::ProviderConfig;
use crate::error::Result;

/// Create the configured provider, reading its API key from the environment
///
/// # Errors
///
/// Returns error if the API key variable is unset or the HTTP client
/// cannot be built
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    Ok(Box::new(OpenAiProvider::from_env(config.clone())?))
}
