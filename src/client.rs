//! Client for the relay server
//!
//! [`RelayApi`] is the seam the conversation and todo managers talk
//! through; [`RelayClient`] is the reqwest implementation.

use crate::config::ClientConfig;
use crate::error::{Result, StudyError};
use crate::providers::ChatMessage;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Loose reply body shared by all relay endpoints
///
/// Each endpoint fills one of the fields; callers pick with a fallback chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayReply {
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            answer: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn plan(text: impl Into<String>) -> Self {
        Self {
            plan: Some(text.into()),
            ..Default::default()
        }
    }

    /// `answer`, else `error`, else `fallback`
    ///
    /// Empty strings count as absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use studyqa::client::RelayReply;
    ///
    /// assert_eq!(RelayReply::answer("4").answer_or("No response."), "4");
    /// assert_eq!(RelayReply::default().answer_or("No response."), "No response.");
    /// ```
    pub fn answer_or(&self, fallback: &str) -> String {
        first_present(&[&self.answer, &self.error]).unwrap_or_else(|| fallback.to_string())
    }

    /// `plan`, else `answer`, else `error`, else `fallback`
    pub fn plan_or(&self, fallback: &str) -> String {
        first_present(&[&self.plan, &self.answer, &self.error])
            .unwrap_or_else(|| fallback.to_string())
    }
}

fn first_present(fields: &[&Option<String>]) -> Option<String> {
    fields
        .iter()
        .filter_map(|field| field.as_deref())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Todo entry as sent to `/plan`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanTodo {
    pub text: String,
    pub due_time: String,
    pub completed: bool,
    pub status: String,
}

impl From<&crate::storage::TodoItem> for PlanTodo {
    fn from(item: &crate::storage::TodoItem) -> Self {
        Self {
            text: item.text.clone(),
            due_time: item.due_time.clone(),
            completed: item.completed,
            status: if item.completed { "completed" } else { "pending" }.to_string(),
        }
    }
}

/// Calls exposed by the relay server
#[async_trait]
pub trait RelayApi: Send + Sync {
    /// `POST /ask {question, messages}`
    async fn ask(&self, question: &str, messages: &[ChatMessage]) -> Result<RelayReply>;

    /// `POST /diagramise {text}`
    async fn diagramise(&self, text: &str) -> Result<RelayReply>;

    /// `POST /plan {todos, currentTime}`
    async fn plan(&self, todos: &[PlanTodo], current_time: &str) -> Result<RelayReply>;
}

/// HTTP client for the relay server
pub struct RelayClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct AskBody<'a> {
    question: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Serialize)]
struct DiagramBody<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanBody<'a> {
    todos: &'a [PlanTodo],
    current_time: &'a str,
}

impl RelayClient {
    /// Create a client from configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| StudyError::Relay(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<R> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(%url, "Calling relay");

        let response = self.client.post(&url).json(body).send().await.map_err(|e| {
            tracing::error!("API error ({}): {}", endpoint, e);
            StudyError::Relay(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("API error ({}): status {}", endpoint, status.as_u16());
            return Err(StudyError::Relay(format!("HTTP error! status: {}", status.as_u16())).into());
        }

        response.json().await.map_err(|e| {
            tracing::error!("API error ({}): invalid body: {}", endpoint, e);
            StudyError::Relay(format!("Invalid response body: {}", e)).into()
        })
    }
}

#[async_trait]
impl RelayApi for RelayClient {
    async fn ask(&self, question: &str, messages: &[ChatMessage]) -> Result<RelayReply> {
        self.post("/ask", &AskBody { question, messages }).await
    }

    async fn diagramise(&self, text: &str) -> Result<RelayReply> {
        self.post("/diagramise", &DiagramBody { text }).await
    }

    async fn plan(&self, todos: &[PlanTodo], current_time: &str) -> Result<RelayReply> {
        self.post("/plan", &PlanBody { todos, current_time }).await
    }
}
