//! Persistent key-value storage and the typed adapter on top of it
//!
//! Every list lives under a fixed string key as a JSON array. Reads and
//! writes never propagate failures to callers: a broken or missing value
//! is logged and treated as empty, and a failed write is logged and dropped.

use crate::config::StorageConfig;
use crate::error::{Result, StudyError};
use anyhow::Context;
use chrono::Utc;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub mod types;
pub use types::{
    Conversation, LegacyResponse, Message, Role, TodoHistoryEntry, TodoItem, DEFAULT_TITLE,
};

/// Key holding the conversation list
pub const CONVERSATIONS_KEY: &str = "studyqa:qaConversations";
/// Key holding legacy flat question/answer records
pub const LEGACY_RESPONSES_KEY: &str = "studyqa:savedResponses";
/// Key holding todo items
pub const TODO_ITEMS_KEY: &str = "studyqa:todoItems";
/// Key holding generated plan snapshots
pub const TODO_HISTORY_KEY: &str = "studyqa:todoHistory";
/// Key holding the ID of the active conversation
pub const ACTIVE_CONVERSATION_KEY: &str = "studyqa:activeConversation";

/// Maximum number of plan snapshots retained
pub const TODO_HISTORY_LIMIT: usize = 50;

/// Raw string key-value backend
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// SQLite-backed key-value store
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Create a store in the user's data directory
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "studyqa", "studyqa")
            .ok_or_else(|| StudyError::Storage("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| StudyError::Storage(e.to_string()))?;

        Self::new_with_path(data_dir.join("studyqa.db"))
    }

    /// Create a store backed by the given database file
    ///
    /// # Examples
    ///
    /// ```
    /// use studyqa::storage::{KeyValueStore, SqliteStore};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = SqliteStore::new_with_path(dir.path().join("kv.db")).unwrap();
    /// store.set("greeting", "hello").unwrap();
    /// assert_eq!(store.get("greeting").unwrap().as_deref(), Some("hello"));
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| StudyError::Storage(e.to_string()))?;
        }

        let store = Self { db_path };
        store.init()?;
        Ok(store)
    }

    /// Path of the underlying database file
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| StudyError::Storage(e.to_string()).into())
    }

    fn init(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(|e| StudyError::Storage(e.to_string()))?;

        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.open()?;

        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .context("Failed to query key")
            .map_err(|e| StudyError::Storage(e.to_string()))?;

        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.open()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )
        .context("Failed to write key")
        .map_err(|e| StudyError::Storage(e.to_string()))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.open()?;

        conn.execute("DELETE FROM kv_store WHERE key = ?", params![key])
            .context("Failed to delete key")
            .map_err(|e| StudyError::Storage(e.to_string()))?;

        Ok(())
    }
}

/// In-process key-value store, used for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| StudyError::Storage("memory store lock poisoned".to_string()).into())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Typed access to the persisted lists
///
/// Cloning is cheap; clones share the same backend.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn KeyValueStore>,
}

impl Storage {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Storage over a fresh [`MemoryStore`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Open the SQLite store described by `config`
    pub fn open(config: &StorageConfig) -> Result<Self> {
        let store = match &config.path {
            Some(path) => SqliteStore::new_with_path(path.clone())?,
            None => SqliteStore::new()?,
        };
        tracing::debug!(path = %store.path().display(), "Opened storage");
        Ok(Self::new(Arc::new(store)))
    }

    /// Raw backend access
    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.backend
    }

    fn try_load_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(Vec::new());
        };

        let value: serde_json::Value = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse stored value for {}", key))?;

        if !value.is_array() {
            tracing::warn!(key = %key, "Stored value is not a list, treating as empty");
            return Ok(Vec::new());
        }

        let items = serde_json::from_value(value)
            .with_context(|| format!("Failed to deserialize stored list for {}", key))?;
        Ok(items)
    }

    fn load_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.try_load_list(key) {
            Ok(items) => items,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Failed to load stored list");
                Vec::new()
            }
        }
    }

    fn save_list<T: Serialize>(&self, key: &str, items: &[T]) {
        let result = serde_json::to_string_pretty(items)
            .context("Failed to serialize list")
            .and_then(|json| self.backend.set(key, &json));

        if let Err(e) = result {
            tracing::error!(key = %key, error = %e, "Failed to save list");
        }
    }

    /// Load conversations, migrating legacy records when none exist yet
    pub fn load_conversations(&self) -> Vec<Conversation> {
        let conversations: Vec<Conversation> = self.load_list(CONVERSATIONS_KEY);
        if !conversations.is_empty() {
            return conversations;
        }

        let legacy = self.load_legacy_responses();
        if legacy.is_empty() {
            return conversations;
        }

        tracing::info!(count = legacy.len(), "Migrating legacy responses to conversations");
        let migrated: Vec<Conversation> = legacy
            .into_iter()
            .map(LegacyResponse::into_conversation)
            .collect();
        self.save_conversations(&migrated);
        migrated
    }

    pub fn save_conversations(&self, conversations: &[Conversation]) {
        self.save_list(CONVERSATIONS_KEY, conversations);
    }

    /// ID of the conversation that was active when the last session ended
    pub fn load_active_id(&self) -> Option<String> {
        match self.backend.get(ACTIVE_CONVERSATION_KEY) {
            Ok(id) => id.filter(|id| !id.is_empty()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load active conversation");
                None
            }
        }
    }

    pub fn save_active_id(&self, id: &str) {
        if let Err(e) = self.backend.set(ACTIVE_CONVERSATION_KEY, id) {
            tracing::error!(error = %e, "Failed to save active conversation");
        }
    }

    pub fn load_legacy_responses(&self) -> Vec<LegacyResponse> {
        self.load_list(LEGACY_RESPONSES_KEY)
    }

    pub fn save_legacy_responses(&self, responses: &[LegacyResponse]) {
        self.save_list(LEGACY_RESPONSES_KEY, responses);
    }

    pub fn load_todo_items(&self) -> Vec<TodoItem> {
        self.load_list(TODO_ITEMS_KEY)
    }

    pub fn save_todo_items(&self, items: &[TodoItem]) {
        self.save_list(TODO_ITEMS_KEY, items);
    }

    /// Plan snapshots, newest first
    pub fn load_todo_history(&self) -> Vec<TodoHistoryEntry> {
        self.load_list(TODO_HISTORY_KEY)
    }

    /// Record a plan snapshot at the front, dropping the oldest beyond
    /// [`TODO_HISTORY_LIMIT`]
    ///
    /// Returns the stored history, newest first.
    pub fn record_todo_history(&self, entry: TodoHistoryEntry) -> Vec<TodoHistoryEntry> {
        let mut history = self.load_todo_history();
        history.insert(0, entry);
        history.truncate(TODO_HISTORY_LIMIT);
        self.save_list(TODO_HISTORY_KEY, &history);
        history
    }
}
