//! Todo manager and AI day planner

use crate::client::{PlanTodo, RelayApi};
use crate::error::InputError;
use crate::render::{markdown_to_html, RenderTarget, Renderer};
use crate::status::{Status, StatusLine, StatusReporter};
use crate::storage::{Storage, TodoHistoryEntry, TodoItem};

use chrono::Utc;
use std::sync::Arc;

/// Planner content before any plan is requested
pub const PLAN_PLACEHOLDER: &str = "Your plan will appear here";
const EMPTY_PLAN_PLACEHOLDER: &str = "Add todos to generate a plan.";
const FAILED_PLAN_PLACEHOLDER: &str = "Unable to generate a plan.";

/// Current local time in the format sent to `/plan`
pub fn local_time_string() -> String {
    chrono::Local::now()
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}

pub struct TodoManager {
    storage: Storage,
    relay: Arc<dyn RelayApi>,
    renderer: Renderer,
    items: Vec<TodoItem>,
    planner: String,
    status: StatusLine,
}

impl TodoManager {
    pub fn load(storage: Storage, relay: Arc<dyn RelayApi>, renderer: Renderer) -> Self {
        let items = storage.load_todo_items();
        tracing::debug!(count = items.len(), "Loaded todos");

        Self {
            storage,
            relay,
            renderer,
            items,
            planner: PLAN_PLACEHOLDER.to_string(),
            status: StatusLine::new(),
        }
    }

    pub fn set_status_reporter(&mut self, reporter: StatusReporter) {
        self.status.set_reporter(reporter);
    }

    pub fn status(&self) -> &Status {
        self.status.current()
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    /// Markdown currently shown in the planner
    pub fn planner(&self) -> &str {
        &self.planner
    }

    /// Resolve a full ID or an unambiguous ID prefix
    pub fn resolve_id(&self, id_or_prefix: &str) -> Option<String> {
        if id_or_prefix.is_empty() {
            return None;
        }
        let mut matches = self
            .items
            .iter()
            .filter(|item| item.id == id_or_prefix || item.id.starts_with(id_or_prefix));
        match (matches.next(), matches.next()) {
            (Some(only), None) => Some(only.id.clone()),
            _ => self
                .items
                .iter()
                .find(|item| item.id == id_or_prefix)
                .map(|item| item.id.clone()),
        }
    }

    fn persist(&self) {
        self.storage.save_todo_items(&self.items);
    }

    /// Add a todo
    ///
    /// # Errors
    ///
    /// `InputError::EmptyTodoText` or `InputError::EmptyDueTime`; the list is
    /// left unchanged
    pub fn add(&mut self, text: &str, due_time: &str) -> Result<&TodoItem, InputError> {
        let text = text.trim();
        let due_time = due_time.trim();

        let check = if text.is_empty() {
            Err(InputError::EmptyTodoText)
        } else if due_time.is_empty() {
            Err(InputError::EmptyDueTime)
        } else {
            Ok(())
        };
        if let Err(e) = check {
            self.status.set(e.to_string());
            return Err(e);
        }

        self.items.push(TodoItem::new(text, due_time));
        self.persist();
        self.status.set("Todo added.");
        tracing::info!(due = %due_time, "Added todo");
        Ok(&self.items[self.items.len() - 1])
    }

    /// Replace the text and due time of a todo; `Ok(false)` when unknown
    ///
    /// # Errors
    ///
    /// `InputError::IncompleteEdit` when either value is blank
    pub fn edit(&mut self, id: &str, text: &str, due_time: &str) -> Result<bool, InputError> {
        let text = text.trim();
        let due_time = due_time.trim();
        if text.is_empty() || due_time.is_empty() {
            self.status.set(InputError::IncompleteEdit.to_string());
            return Err(InputError::IncompleteEdit);
        }

        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return Ok(false);
        };
        item.text = text.to_string();
        item.due_time = due_time.to_string();

        self.persist();
        self.status.set("Todo updated.");
        Ok(true)
    }

    /// Flip completion; returns the new value, `None` when unknown
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let item = self.items.iter_mut().find(|item| item.id == id)?;
        item.completed = !item.completed;
        let completed = item.completed;

        self.persist();
        self.status.set(if completed {
            "Marked complete."
        } else {
            "Marked active."
        });
        Some(completed)
    }

    /// Remove a todo; `false` when unknown
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            return false;
        }

        self.persist();
        self.status.set("Todo removed.");
        true
    }

    /// Remove every todo and reset the planner
    pub fn clear(&mut self) {
        self.items.clear();
        self.planner = PLAN_PLACEHOLDER.to_string();
        self.persist();
        self.status.set("Todo list cleared.");
    }

    /// Ask the relay for a plan covering every todo
    ///
    /// Returns the rendered markdown, which is a placeholder when the
    /// request fails. Successful plans are recorded in the todo history.
    ///
    /// # Errors
    ///
    /// `InputError::NothingToPlan` when the list is empty; nothing is sent
    pub async fn plan(
        &mut self,
        current_time: &str,
        target: &mut dyn RenderTarget,
    ) -> Result<String, InputError> {
        if self.items.is_empty() {
            self.show_planner(EMPTY_PLAN_PLACEHOLDER, target);
            self.status.set(InputError::NothingToPlan.to_string());
            return Err(InputError::NothingToPlan);
        }

        let payload: Vec<PlanTodo> = self.items.iter().map(PlanTodo::from).collect();

        self.status.loading("Planning your day...");
        let relay = Arc::clone(&self.relay);
        match relay.plan(&payload, current_time).await {
            Ok(reply) => {
                let markdown = reply.plan_or("No plan returned.");
                self.show_planner(&markdown, target);
                self.storage.record_todo_history(TodoHistoryEntry {
                    title: format!("Plan for {}", current_time),
                    summary_html: markdown_to_html(&markdown),
                    timestamp: Utc::now(),
                });
                self.status.set("Plan ready.");
                Ok(markdown)
            }
            Err(e) => {
                tracing::error!("Plan request failed: {:#}", e);
                self.show_planner(FAILED_PLAN_PLACEHOLDER, target);
                self.status.set("Could not generate a plan.");
                Ok(FAILED_PLAN_PLACEHOLDER.to_string())
            }
        }
    }

    fn show_planner(&mut self, markdown: &str, target: &mut dyn RenderTarget) {
        self.planner = markdown.to_string();
        self.renderer.render_now(markdown, target);
    }

    /// Recorded plans, newest first
    pub fn history(&self) -> Vec<TodoHistoryEntry> {
        self.storage.load_todo_history()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RelayReply;
    use crate::render::HtmlBuffer;
    use crate::test_utils::{FakeRelay, RelayCall};

    fn manager_with(relay: Arc<FakeRelay>) -> (TodoManager, Storage) {
        let storage = Storage::in_memory();
        let manager = TodoManager::load(storage.clone(), relay, Renderer::immediate());
        (manager, storage)
    }

    #[test]
    fn test_add_grows_list_by_one() {
        let (mut manager, storage) = manager_with(FakeRelay::new());
        manager.add("Read chapter 3", "09:30").unwrap();
        manager.add("  Flashcards ", "10:00").unwrap();

        assert_eq!(manager.items().len(), 2);
        assert_eq!(manager.items()[1].text, "Flashcards");
        assert_eq!(manager.status().text, "Todo added.");
        assert_eq!(storage.load_todo_items().len(), 2);
    }

    #[test]
    fn test_add_rejects_blank_text_or_time() {
        let (mut manager, _) = manager_with(FakeRelay::new());

        assert_eq!(manager.add("  ", "09:00").unwrap_err(), InputError::EmptyTodoText);
        assert_eq!(manager.status().text, "Please add a todo first.");

        assert_eq!(manager.add("Read", "").unwrap_err(), InputError::EmptyDueTime);
        assert_eq!(manager.status().text, "Please select a due time.");

        assert!(manager.items().is_empty());
    }

    #[test]
    fn test_edit_replaces_in_place() {
        let (mut manager, _) = manager_with(FakeRelay::new());
        let id = manager.add("Read", "09:00").unwrap().id.clone();

        assert_eq!(manager.edit(&id, "Re-read", "11:00"), Ok(true));
        assert_eq!(manager.items()[0].text, "Re-read");
        assert_eq!(manager.items()[0].due_time, "11:00");
        assert_eq!(manager.items()[0].id, id);
        assert_eq!(manager.status().text, "Todo updated.");
    }

    #[test]
    fn test_edit_requires_both_fields() {
        let (mut manager, _) = manager_with(FakeRelay::new());
        let id = manager.add("Read", "09:00").unwrap().id.clone();

        assert_eq!(manager.edit(&id, "", "11:00"), Err(InputError::IncompleteEdit));
        assert_eq!(manager.status().text, "Please enter both task and time.");
        assert_eq!(manager.items()[0].text, "Read");
    }

    #[test]
    fn test_toggle_flips_and_reports() {
        let (mut manager, _) = manager_with(FakeRelay::new());
        let id = manager.add("Read", "09:00").unwrap().id.clone();

        assert_eq!(manager.toggle(&id), Some(true));
        assert_eq!(manager.status().text, "Marked complete.");
        assert_eq!(manager.toggle(&id), Some(false));
        assert_eq!(manager.status().text, "Marked active.");
        assert_eq!(manager.toggle("missing"), None);
    }

    #[test]
    fn test_delete_and_clear() {
        let (mut manager, storage) = manager_with(FakeRelay::new());
        let id = manager.add("Read", "09:00").unwrap().id.clone();
        manager.add("Write", "10:00").unwrap();

        assert!(manager.delete(&id));
        assert!(!manager.delete(&id));
        assert_eq!(manager.status().text, "Todo removed.");

        manager.clear();
        assert!(manager.items().is_empty());
        assert!(storage.load_todo_items().is_empty());
        assert_eq!(manager.status().text, "Todo list cleared.");
    }

    #[test]
    fn test_resolve_id_by_prefix() {
        let (mut manager, _) = manager_with(FakeRelay::new());
        let id = manager.add("Read", "09:00").unwrap().id.clone();
        assert_eq!(manager.resolve_id(&id[..8]), Some(id));
        assert_eq!(manager.resolve_id("zzzz"), None);
    }

    #[tokio::test]
    async fn test_plan_without_items_sends_nothing() {
        let relay = FakeRelay::new();
        let (mut manager, _) = manager_with(relay.clone());
        let mut target = HtmlBuffer::default();

        let err = manager.plan("9:00 AM", &mut target).await.unwrap_err();

        assert_eq!(err, InputError::NothingToPlan);
        assert_eq!(manager.planner(), "Add todos to generate a plan.");
        assert_eq!(manager.status().text, "Add at least one todo to plan your day.");
        assert!(relay.calls().is_empty());
    }

    #[tokio::test]
    async fn test_plan_sends_items_and_records_history() {
        let relay = FakeRelay::new();
        relay.push_reply(RelayReply::plan("## Morning\n- Read"));
        let (mut manager, storage) = manager_with(relay.clone());
        let id = manager.add("Read", "09:00").unwrap().id.clone();
        manager.add("Quiz", "13:00").unwrap();
        manager.toggle(&id);
        let mut target = HtmlBuffer::default();

        let markdown = manager.plan("8:00:00 AM", &mut target).await.unwrap();

        assert_eq!(markdown, "## Morning\n- Read");
        assert_eq!(manager.status().text, "Plan ready.");
        assert!(target.html.contains("<h2>Morning</h2>"));

        match &relay.calls()[0] {
            RelayCall::Plan {
                todos,
                current_time,
            } => {
                assert_eq!(current_time, "8:00:00 AM");
                assert_eq!(todos.len(), 2);
                assert_eq!(todos[0].status, "completed");
                assert_eq!(todos[1].status, "pending");
            }
            other => panic!("unexpected call {:?}", other),
        }

        let history = storage.load_todo_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].title, "Plan for 8:00:00 AM");
        assert_eq!(history[0].summary_html, target.html);
    }

    #[tokio::test]
    async fn test_plan_failure_shows_placeholder() {
        let relay = FakeRelay::new();
        relay.push_failure("HTTP error! status: 500");
        let (mut manager, storage) = manager_with(relay);
        manager.add("Read", "09:00").unwrap();
        let mut target = HtmlBuffer::default();

        let markdown = manager.plan("now", &mut target).await.unwrap();

        assert_eq!(markdown, "Unable to generate a plan.");
        assert_eq!(manager.status().text, "Could not generate a plan.");
        assert!(storage.load_todo_history().is_empty());
    }

    #[tokio::test]
    async fn test_history_is_newest_first() {
        let relay = FakeRelay::new();
        relay.push_reply(RelayReply::plan("first"));
        relay.push_reply(RelayReply::answer("second"));
        let (mut manager, storage) = manager_with(relay);
        manager.add("Read", "09:00").unwrap();
        let mut target = HtmlBuffer::default();

        manager.plan("t1", &mut target).await.unwrap();
        manager.plan("t2", &mut target).await.unwrap();

        let history = manager.history();
        assert_eq!(history[0].title, "Plan for t2");
        assert_eq!(history[1].title, "Plan for t1");
        // Persisted in the same order.
        assert_eq!(storage.load_todo_history(), history);
    }

    #[test]
    fn test_local_time_string_has_meridiem() {
        let now = local_time_string();
        assert!(now.ends_with("AM") || now.ends_with("PM"));
    }
}
