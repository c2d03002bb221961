//! Handlers for `/ask`, `/diagramise` and `/plan`

use super::error::RelayError;
use super::RelayState;
use crate::prompts;
use crate::providers::ChatMessage;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of `POST /ask`
#[derive(Debug, Default, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
}

/// Body of `POST /diagramise`
#[derive(Debug, Default, Deserialize)]
pub struct DiagramRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Body of `POST /plan`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    #[serde(default)]
    pub todos: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub current_time: Option<String>,
}

/// Response of `/ask` and `/diagramise`
#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}

/// Response of `/plan`
#[derive(Debug, Serialize, Deserialize)]
pub struct PlanResponse {
    pub plan: String,
}

/// Missing or empty fields are rejected; whitespace is forwarded as-is
fn required(field: Option<String>, message: &str) -> Result<String, RelayError> {
    field
        .filter(|value| !value.is_empty())
        .ok_or_else(|| RelayError::BadRequest(message.to_string()))
}

pub async fn ask(
    State(state): State<Arc<RelayState>>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, RelayError> {
    let Json(request) = payload?;
    let question = required(request.question, "Question is required")?;

    let mut messages = vec![ChatMessage::system(prompts::ASK_SYSTEM_PROMPT)];
    match request.messages.filter(|m| state.forward_history && !m.is_empty()) {
        Some(history) => {
            tracing::debug!(count = history.len(), "Forwarding client history");
            messages.extend(history);
        }
        None => messages.push(ChatMessage::user(question)),
    }

    let completion = state.provider.complete(&messages).await?;
    Ok(Json(AnswerResponse {
        answer: completion.content,
    }))
}

pub async fn diagramise(
    State(state): State<Arc<RelayState>>,
    payload: Result<Json<DiagramRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, RelayError> {
    let Json(request) = payload?;
    let text = required(request.text, "Text is required")?;

    let messages = [
        ChatMessage::system(prompts::DIAGRAM_SYSTEM_PROMPT),
        ChatMessage::user(text),
    ];
    let completion = state.provider.complete(&messages).await?;
    Ok(Json(AnswerResponse {
        answer: completion.content,
    }))
}

pub async fn plan(
    State(state): State<Arc<RelayState>>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<PlanResponse>, RelayError> {
    let Json(request) = payload?;
    let todos = request
        .todos
        .filter(|todos| !todos.is_empty())
        .ok_or_else(|| RelayError::BadRequest("Todos are required".to_string()))?;

    let current_time = request
        .current_time
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(crate::todo::local_time_string);
    let todos_json = serde_json::to_string_pretty(&todos).map_err(anyhow::Error::from)?;

    let messages = [
        ChatMessage::system(prompts::PLAN_SYSTEM_PROMPT),
        ChatMessage::user(prompts::plan_user_prompt(&current_time, &todos_json)),
    ];
    let completion = state.provider.complete(&messages).await?;
    Ok(Json(PlanResponse {
        plan: completion.content,
    }))
}
