//! OpenAI-compatible chat-completion provider
//!
//! Talks to any endpoint implementing `POST {base_url}/chat/completions`
//! (DeepSeek by default) using a bearer API key.

use crate::config::ProviderConfig;
use crate::error::{Result, StudyError};
use crate::providers::{ChatMessage, CompletionResponse, Provider, TokenUsage};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI-compatible API provider
///
/// # Examples
///
/// ```no_run
/// use studyqa::config::ProviderConfig;
/// use studyqa::providers::{ChatMessage, OpenAiProvider, Provider};
///
/// # async fn example() -> studyqa::error::Result<()> {
/// let provider = OpenAiProvider::new(ProviderConfig::default(), "sk-test")?;
/// let completion = provider.complete(&[ChatMessage::user("Hello!")]).await?;
/// println!("{}", completion.content);
/// # Ok(())
/// # }
/// ```
pub struct OpenAiProvider {
    client: Client,
    config: ProviderConfig,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

impl OpenAiProvider {
    /// Create a provider with an explicit API key
    pub fn new(config: ProviderConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| StudyError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized chat-completion provider: base_url={}, model={}",
            config.base_url,
            config.model
        );

        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
        })
    }

    /// Create a provider reading the API key from `config.api_key_env`
    ///
    /// # Errors
    ///
    /// Returns `StudyError::MissingCredentials` when the variable is unset or empty
    pub fn from_env(config: ProviderConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| StudyError::MissingCredentials(config.api_key_env.clone()))?;
        Self::new(config, api_key)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<CompletionResponse> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            stream: false,
        };

        tracing::debug!(
            "Sending completion request: {} messages, model={}",
            messages.len(),
            self.config.model
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Completion request failed: {}", e);
                StudyError::Provider(format!("Completion request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Provider returned error {}: {}", status, error_text);
            return Err(StudyError::Provider(format!(
                "Provider returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse completion response: {}", e);
            StudyError::Provider(format!("Failed to parse completion response: {}", e))
        })?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| StudyError::Provider("Completion returned no choices".to_string()))?;

        Ok(match body.usage {
            Some(usage) => {
                tracing::debug!(
                    "Completion usage: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens,
                    usage.completion_tokens
                );
                CompletionResponse::with_usage(
                    content,
                    TokenUsage::new(usage.prompt_tokens, usage.completion_tokens),
                )
            }
            None => CompletionResponse::new(content),
        })
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
