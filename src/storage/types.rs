use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Title given to conversations before the first user message arrives
pub const DEFAULT_TITLE: &str = "New chat";

/// Maximum characters of the first user message kept as a title
pub const TITLE_MAX_CHARS: usize = 48;

/// Author of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat message; never modified after it is appended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a user message stamped with the current time
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates an assistant message stamped with the current time
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A Q&A thread with its metadata
///
/// Serialized with camelCase keys so the persisted layout stays
/// `{id, title, messages, createdAt, updatedAt, isFavorite}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Conversation {
    /// Creates an empty conversation titled "New chat"
    ///
    /// # Examples
    ///
    /// ```
    /// use studyqa::storage::{Conversation, DEFAULT_TITLE};
    ///
    /// let convo = Conversation::new();
    /// assert_eq!(convo.title, DEFAULT_TITLE);
    /// assert!(convo.messages.is_empty());
    /// assert!(!convo.is_favorite);
    /// ```
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            is_favorite: false,
        }
    }

    /// Appends a message, bumps `updated_at` and derives the title from the
    /// first user message while the default title is still in place
    ///
    /// # Examples
    ///
    /// ```
    /// use studyqa::storage::{Conversation, Message};
    ///
    /// let mut convo = Conversation::new();
    /// convo.append(Message::user("What is osmosis?"));
    /// convo.append(Message::assistant("Diffusion of water..."));
    /// assert_eq!(convo.title, "What is osmosis?");
    /// assert_eq!(convo.messages.len(), 2);
    /// ```
    pub fn append(&mut self, message: Message) {
        if message.role == Role::User && self.title == DEFAULT_TITLE {
            self.title = truncate(&message.content, TITLE_MAX_CHARS);
        }
        self.updated_at = Utc::now().max(self.updated_at);
        self.messages.push(message);
    }

    /// Content of the most recent assistant message, if any
    pub fn latest_assistant_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// A single todo entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: String,
    pub text: String,
    pub due_time: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl TodoItem {
    pub fn new(text: impl Into<String>, due_time: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            due_time: due_time.into(),
            completed: false,
            created_at: Utc::now(),
        }
    }
}

/// Snapshot of a generated day plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoHistoryEntry {
    pub title: String,
    #[serde(rename = "summaryHTML")]
    pub summary_html: String,
    pub timestamp: DateTime<Utc>,
}

/// Flat question/answer record from the single-response data model
///
/// Only read back for migration into [`Conversation`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(
        rename = "answerHTML",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub answer_html: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_memeified: bool,
}

impl LegacyResponse {
    /// Converts the record into a two-message conversation
    pub fn into_conversation(self) -> Conversation {
        let stamp = self.timestamp.unwrap_or_else(Utc::now);
        let question = self.question.unwrap_or_default();
        let title = if question.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            question.clone()
        };

        Conversation {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            messages: vec![
                Message {
                    role: Role::User,
                    content: question,
                    timestamp: stamp,
                },
                Message {
                    role: Role::Assistant,
                    content: self.answer.unwrap_or_default(),
                    timestamp: stamp,
                },
            ],
            created_at: stamp,
            updated_at: stamp,
            is_favorite: self.is_favorite,
        }
    }
}

/// Truncates `text` to `max_chars` characters, appending "..." when cut
///
/// # Examples
///
/// ```
/// use studyqa::storage::types::truncate;
///
/// assert_eq!(truncate("short", 10), "short");
/// assert_eq!(truncate("abcdefghij", 4), "abcd...");
/// ```
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
