//! Conversation manager
//!
//! Owns the conversation list and the active pointer, persists every
//! mutation through [`Storage`], and drives the ask, diagram and document
//! summary flows against the relay.
//!
//! Network failures never escape these flows: they become a synthetic
//! assistant message plus a status line.

use crate::client::RelayApi;
use crate::document::{self, DocumentContext};
use crate::error::{user_message, InputError, Result, StudyError};
use crate::prompts;
use crate::providers::ChatMessage;
use crate::render::{RenderTarget, Renderer};
use crate::status::{Status, StatusLine, StatusReporter};
use crate::storage::{Conversation, Message, Role, Storage};

use std::path::Path;
use std::sync::Arc;

/// Messages included in the context window sent with every ask
pub const CONTEXT_WINDOW: usize = 8;

/// Status shown when the session is idle
pub const READY_STATUS: &str = "Ready when you are.";

const FAILURE_REPLY: &str = "Something went wrong. Please try again.";

/// Conversations split for display, each group newest first
#[derive(Debug, Default)]
pub struct Listing<'a> {
    pub favorites: Vec<&'a Conversation>,
    pub others: Vec<&'a Conversation>,
}

pub struct ConversationManager {
    storage: Storage,
    relay: Arc<dyn RelayApi>,
    renderer: Renderer,
    conversations: Vec<Conversation>,
    active_id: String,
    document: Option<DocumentContext>,
    status: StatusLine,
}

impl ConversationManager {
    /// Load conversations from storage
    ///
    /// Creates and persists a fresh conversation when none exist. The
    /// stored active ID wins when it still exists; otherwise the most
    /// recently updated conversation becomes active.
    pub fn load(storage: Storage, relay: Arc<dyn RelayApi>, renderer: Renderer) -> Self {
        let mut conversations = storage.load_conversations();

        if conversations.is_empty() {
            conversations.push(Conversation::new());
            storage.save_conversations(&conversations);
        }

        let active_id = storage
            .load_active_id()
            .filter(|id| conversations.iter().any(|c| &c.id == id))
            .or_else(|| most_recent(&conversations).map(|c| c.id.clone()))
            .unwrap_or_default();

        tracing::debug!(count = conversations.len(), active = %active_id, "Loaded conversations");

        let mut status = StatusLine::new();
        status.set(READY_STATUS);

        Self {
            storage,
            relay,
            renderer,
            conversations,
            active_id,
            document: None,
            status,
        }
    }

    pub fn set_status_reporter(&mut self, reporter: StatusReporter) {
        self.status.set_reporter(reporter);
    }

    pub fn status(&self) -> &Status {
        self.status.current()
    }

    /// Report a settled status for work done outside the manager
    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status.set(text);
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Resolve a full ID or an unambiguous ID prefix
    pub fn resolve_id(&self, id_or_prefix: &str) -> Option<String> {
        if let Some(convo) = self.get(id_or_prefix) {
            return Some(convo.id.clone());
        }
        let mut matches = self
            .conversations
            .iter()
            .filter(|c| !id_or_prefix.is_empty() && c.id.starts_with(id_or_prefix));
        match (matches.next(), matches.next()) {
            (Some(only), None) => Some(only.id.clone()),
            _ => None,
        }
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    pub fn active(&self) -> &Conversation {
        match self.active_index() {
            Some(idx) => &self.conversations[idx],
            // The list is never empty after load.
            None => &self.conversations[0],
        }
    }

    fn active_index(&self) -> Option<usize> {
        self.conversations
            .iter()
            .position(|c| c.id == self.active_id)
    }

    fn active_mut(&mut self) -> &mut Conversation {
        if self.active_index().is_none() {
            self.create_conversation();
        }
        let idx = self.active_index().unwrap_or(0);
        &mut self.conversations[idx]
    }

    fn persist(&self) {
        self.storage.save_conversations(&self.conversations);
        self.storage.save_active_id(&self.active_id);
    }

    fn create_conversation(&mut self) -> &Conversation {
        let convo = Conversation::new();
        self.active_id = convo.id.clone();
        self.conversations.insert(0, convo);
        &self.conversations[0]
    }

    /// Start a new empty conversation and make it active
    pub fn new_query(&mut self) -> &Conversation {
        self.create_conversation();
        self.persist();
        self.status.set(READY_STATUS);
        tracing::info!(id = %self.active_id, "Started new conversation");
        self.active()
    }

    /// Make `id` the active conversation; `false` when unknown
    pub fn set_active(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.active_id = id.to_string();
        self.storage.save_active_id(id);
        self.status.set(READY_STATUS);
        true
    }

    /// Append a message to the active conversation and persist
    pub fn append_message(&mut self, message: Message) {
        self.active_mut().append(message);
        self.persist();
    }

    pub fn listing(&self) -> Listing<'_> {
        let mut sorted: Vec<&Conversation> = self.conversations.iter().collect();
        sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        let (favorites, others): (Vec<_>, Vec<_>) =
            sorted.into_iter().partition(|c| c.is_favorite);
        Listing { favorites, others }
    }

    /// Delete a conversation; `false` when unknown
    ///
    /// At least one conversation always remains. Deleting the active one
    /// promotes the most recently updated survivor.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id != id);
        if self.conversations.len() == before {
            return false;
        }

        if self.conversations.is_empty() {
            self.create_conversation();
        } else if self.active_id == id {
            if let Some(next) = most_recent(&self.conversations) {
                self.active_id = next.id.clone();
            }
        }

        self.persist();
        tracing::info!(id = %id, "Deleted conversation");
        true
    }

    /// Flip the favorite flag; returns the new value, `None` when unknown
    pub fn toggle_favorite(&mut self, id: &str) -> Option<bool> {
        let convo = self.conversations.iter_mut().find(|c| c.id == id)?;
        convo.is_favorite = !convo.is_favorite;
        let value = convo.is_favorite;
        self.persist();
        Some(value)
    }

    /// Toggle the favorite flag of the active conversation
    pub fn bookmark(&mut self) -> bool {
        let id = self.active().id.clone();
        self.toggle_favorite(&id).unwrap_or(false)
    }

    /// `ROLE: content` blocks of the active conversation
    pub fn export_text(&self) -> String {
        self.active()
            .messages
            .iter()
            .map(|m| format!("{}: {}", m.role.as_str().to_uppercase(), m.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn latest_assistant_text(&self) -> Option<&str> {
        self.active().latest_assistant_text()
    }

    pub fn attach_document(&mut self, document: DocumentContext) {
        tracing::info!(name = %document.name, "Attached document");
        self.document = Some(document);
    }

    pub fn detach_document(&mut self) -> Option<DocumentContext> {
        self.document.take()
    }

    pub fn document(&self) -> Option<&DocumentContext> {
        self.document.as_ref()
    }

    /// Messages sent with an ask for the active conversation
    ///
    /// A system message carrying the previous user message and the recent
    /// window comes first, followed by the whole conversation. With a
    /// document attached, the latest user turn is replaced by the document
    /// instruction.
    pub fn request_messages(&self, question: &str) -> Vec<ChatMessage> {
        let messages = &self.active().messages;

        let previous_user = messages
            .iter()
            .rev()
            .skip(1)
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("");

        let window_start = messages.len().saturating_sub(CONTEXT_WINDOW);
        let recent: Vec<ChatMessage> = messages[window_start..]
            .iter()
            .map(ChatMessage::from)
            .collect();

        let context = serde_json::json!({
            "lastUserMessage": previous_user,
            "recentMessages": recent,
        });

        let mut request = vec![ChatMessage::system(format!("Context JSON: {}", context))];
        request.extend(messages.iter().map(ChatMessage::from));

        if let Some(doc) = &self.document {
            if let Some(turn) = request.iter_mut().rev().find(|m| m.role == "user") {
                turn.content = prompts::document_turn(question, &doc.name, &doc.text);
            }
        }

        request
    }

    /// Ask a question in the active conversation
    ///
    /// Returns the assistant text appended to the conversation, which is
    /// the failure notice when the relay call fails.
    ///
    /// # Errors
    ///
    /// Returns `InputError::EmptyQuestion` for blank input; nothing is sent.
    pub async fn ask(
        &mut self,
        input: &str,
        target: &mut dyn RenderTarget,
    ) -> std::result::Result<String, InputError> {
        let question = input.trim();
        if question.is_empty() {
            self.status.set(InputError::EmptyQuestion.to_string());
            return Err(InputError::EmptyQuestion);
        }

        self.append_message(Message::user(question));
        let messages = self.request_messages(question);

        self.status.loading("Thinking...");
        let relay = Arc::clone(&self.relay);
        match relay.ask(question, &messages).await {
            Ok(reply) => {
                let text = reply.answer_or("No response.");
                self.append_message(Message::assistant(text.clone()));
                self.renderer.render_typed(&text, target).await;
                self.status.set("Answer ready.");
                Ok(text)
            }
            Err(e) => {
                tracing::error!("Answer fetch error: {:#}", e);
                self.append_message(Message::assistant(FAILURE_REPLY));
                self.renderer.render_now(FAILURE_REPLY, target);
                self.status
                    .set(format!("Connection error: {}", user_message(&e)));
                Ok(FAILURE_REPLY.to_string())
            }
        }
    }

    /// Turn the latest assistant answer into an ASCII diagram
    ///
    /// # Errors
    ///
    /// Returns `InputError::NothingToDiagram` when there is no answer yet
    pub async fn diagram(
        &mut self,
        target: &mut dyn RenderTarget,
    ) -> std::result::Result<String, InputError> {
        let answer = match self.latest_assistant_text() {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => {
                self.status.set(InputError::NothingToDiagram.to_string());
                return Err(InputError::NothingToDiagram);
            }
        };

        self.status.loading("Diagramising...");
        let relay = Arc::clone(&self.relay);
        let text = match relay.diagramise(&answer).await {
            Ok(reply) => {
                let diagram = reply.answer_or("No response.");
                self.status.set("Diagram ready.");
                format!("### Memify\n\n```\n{}\n```", diagram)
            }
            Err(e) => {
                tracing::error!("Memify fetch error: {:#}", e);
                let message = format!("Error: {}", user_message(&e));
                self.status.set(message.clone());
                message
            }
        };

        self.append_message(Message::assistant(text.clone()));
        self.renderer.render_now(&text, target);
        Ok(text)
    }

    /// Load a document from disk and summarize it into the active conversation
    ///
    /// Returns the assistant text appended to the conversation.
    pub async fn summarize(&mut self, path: &Path, target: &mut dyn RenderTarget) -> String {
        self.status.loading("Validating PDF...");
        self.status.loading("Parsing PDF pages...");
        match document::load_document(path) {
            Ok(doc) => {
                self.status.loading("PDF parsed - Text extracted");
                self.summarize_document(&doc, target).await
            }
            Err(e) => self.summary_failed(&e, target),
        }
    }

    /// Summarize already extracted document text
    pub async fn summarize_document(
        &mut self,
        doc: &DocumentContext,
        target: &mut dyn RenderTarget,
    ) -> String {
        if doc.text.trim().is_empty() {
            let err = anyhow::Error::from(StudyError::Document(
                "No text found in PDF".to_string(),
            ));
            return self.summary_failed(&err, target);
        }

        self.append_message(Message::user(format!("[PDF] {}", doc.name)));

        self.status.loading("DeepSeek is analyzing...");
        let request = prompts::summary_request(&doc.text);
        let relay = Arc::clone(&self.relay);
        let result: Result<String> = relay
            .ask(&request, &[ChatMessage::user(request.clone())])
            .await
            .map(|reply| {
                reply
                    .answer
                    .filter(|a| !a.is_empty())
                    .unwrap_or_else(|| "No summary generated.".to_string())
            });

        match result {
            Ok(summary) => {
                self.status.loading("Rendering summary...");
                self.append_message(Message::assistant(summary.clone()));
                self.renderer.render_typed(&summary, target).await;
                self.status.set("PDF processed successfully!");
                summary
            }
            Err(e) => self.summary_failed(&e, target),
        }
    }

    fn summary_failed(&mut self, err: &anyhow::Error, target: &mut dyn RenderTarget) -> String {
        tracing::error!("PDF processing error: {:#}", err);
        let text = format!("Error: {}", user_message(err));
        self.append_message(Message::assistant(text.clone()));
        self.renderer.render_now(&text, target);
        self.status.set("Failed to process PDF.");
        text
    }
}

fn most_recent(conversations: &[Conversation]) -> Option<&Conversation> {
    conversations.iter().max_by_key(|c| c.updated_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RelayReply;
    use crate::render::HtmlBuffer;
    use crate::test_utils::{FakeRelay, RelayCall};

    fn manager_with(relay: Arc<FakeRelay>) -> (ConversationManager, Storage) {
        let storage = Storage::in_memory();
        let manager = ConversationManager::load(storage.clone(), relay, Renderer::immediate());
        (manager, storage)
    }

    #[test]
    fn test_load_creates_and_persists_first_conversation() {
        let (manager, storage) = manager_with(FakeRelay::new());
        assert_eq!(manager.conversations().len(), 1);
        assert_eq!(storage.load_conversations().len(), 1);
        assert_eq!(manager.status().text, READY_STATUS);
    }

    #[test]
    fn test_load_activates_most_recently_updated() {
        let storage = Storage::in_memory();
        let mut older = Conversation::new();
        older.updated_at = older.updated_at - chrono::Duration::hours(1);
        let newer = Conversation::new();
        storage.save_conversations(&[older, newer.clone()]);

        let manager = ConversationManager::load(storage, FakeRelay::new(), Renderer::immediate());
        assert_eq!(manager.active_id(), newer.id);
    }

    #[test]
    fn test_switch_survives_reload() {
        let (mut manager, storage) = manager_with(FakeRelay::new());
        let first = manager.active_id().to_string();
        manager.new_query();
        assert!(manager.set_active(&first));

        let reloaded =
            ConversationManager::load(storage.clone(), FakeRelay::new(), Renderer::immediate());
        assert_eq!(reloaded.active_id(), first);

        storage.save_active_id("gone");
        let reloaded = ConversationManager::load(storage, FakeRelay::new(), Renderer::immediate());
        assert_eq!(reloaded.conversations().len(), 2);
        assert_ne!(reloaded.active_id(), "gone");
    }

    #[test]
    fn test_new_query_inserts_at_front() {
        let (mut manager, _) = manager_with(FakeRelay::new());
        let first = manager.active_id().to_string();
        let created = manager.new_query().id.clone();

        assert_eq!(manager.conversations()[0].id, created);
        assert_eq!(manager.active_id(), created);
        assert_ne!(created, first);
    }

    #[test]
    fn test_set_active_unknown_id_is_noop() {
        let (mut manager, _) = manager_with(FakeRelay::new());
        let active = manager.active_id().to_string();
        assert!(!manager.set_active("missing"));
        assert_eq!(manager.active_id(), active);
    }

    #[test]
    fn test_delete_only_conversation_leaves_fresh_one() {
        let (mut manager, storage) = manager_with(FakeRelay::new());
        let id = manager.active_id().to_string();

        assert!(manager.delete(&id));
        assert_eq!(manager.conversations().len(), 1);
        assert_ne!(manager.active_id(), id);
        assert!(manager.active().messages.is_empty());
        assert_eq!(storage.load_conversations().len(), 1);
    }

    #[test]
    fn test_delete_active_promotes_most_recent() {
        let (mut manager, _) = manager_with(FakeRelay::new());
        let first = manager.active_id().to_string();
        manager.append_message(Message::user("bump"));
        let second = manager.new_query().id.clone();

        assert!(manager.delete(&second));
        assert_eq!(manager.active_id(), first);
    }

    #[test]
    fn test_delete_unknown_returns_false() {
        let (mut manager, _) = manager_with(FakeRelay::new());
        assert!(!manager.delete("missing"));
    }

    #[test]
    fn test_toggle_favorite_and_listing() {
        let (mut manager, _) = manager_with(FakeRelay::new());
        let first = manager.active_id().to_string();
        manager.new_query();

        assert_eq!(manager.toggle_favorite(&first), Some(true));
        assert_eq!(manager.toggle_favorite("missing"), None);

        let listing = manager.listing();
        assert_eq!(listing.favorites.len(), 1);
        assert_eq!(listing.favorites[0].id, first);
        assert_eq!(listing.others.len(), 1);
    }

    #[test]
    fn test_bookmark_toggles_active() {
        let (mut manager, _) = manager_with(FakeRelay::new());
        assert!(manager.bookmark());
        assert!(manager.active().is_favorite);
        assert!(!manager.bookmark());
    }

    #[test]
    fn test_messages_keep_insertion_order() {
        let (mut manager, storage) = manager_with(FakeRelay::new());
        for i in 0..5 {
            manager.append_message(Message::user(format!("m{}", i)));
        }

        let stored = storage.load_conversations();
        let contents: Vec<&str> = stored[0].messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m0", "m1", "m2", "m3", "m4"]);
    }

    #[test]
    fn test_export_text_format() {
        let (mut manager, _) = manager_with(FakeRelay::new());
        manager.append_message(Message::user("2+2"));
        manager.append_message(Message::assistant("4"));
        assert_eq!(manager.export_text(), "USER: 2+2\n\nASSISTANT: 4");
    }

    #[test]
    fn test_resolve_id_by_prefix() {
        let (manager, _) = manager_with(FakeRelay::new());
        let id = manager.active_id().to_string();
        assert_eq!(manager.resolve_id(&id[..8]), Some(id.clone()));
        assert_eq!(manager.resolve_id(""), None);
    }

    #[tokio::test]
    async fn test_ask_appends_question_and_answer() {
        let relay = FakeRelay::new();
        relay.push_reply(RelayReply::answer("4"));
        let (mut manager, _) = manager_with(relay.clone());
        let mut target = HtmlBuffer::default();

        let reply = manager.ask("  2+2 ", &mut target).await.unwrap();

        assert_eq!(reply, "4");
        let messages = &manager.active().messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "2+2");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(manager.active().title, "2+2");
        assert_eq!(manager.status().text, "Answer ready.");
        assert_eq!(target.html, "<p>4</p>\n");

        match &relay.calls()[0] {
            RelayCall::Ask { question, messages } => {
                assert_eq!(question, "2+2");
                assert_eq!(messages[0].role, "system");
                assert!(messages[0].content.starts_with("Context JSON: "));
                assert_eq!(messages[1], ChatMessage::user("2+2"));
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ask_empty_question_sends_nothing() {
        let relay = FakeRelay::new();
        let (mut manager, _) = manager_with(relay.clone());
        let mut target = HtmlBuffer::default();

        let err = manager.ask("   ", &mut target).await.unwrap_err();

        assert_eq!(err, InputError::EmptyQuestion);
        assert_eq!(manager.status().text, "Please type a question first.");
        assert!(relay.calls().is_empty());
        assert!(manager.active().messages.is_empty());
    }

    #[tokio::test]
    async fn test_ask_failure_appends_notice() {
        let relay = FakeRelay::new();
        relay.push_failure("HTTP error! status: 500");
        let (mut manager, _) = manager_with(relay);
        let mut target = HtmlBuffer::default();

        let reply = manager.ask("hello", &mut target).await.unwrap();

        assert_eq!(reply, FAILURE_REPLY);
        assert_eq!(
            manager.status().text,
            "Connection error: HTTP error! status: 500"
        );
        assert_eq!(manager.active().messages.len(), 2);
    }

    #[tokio::test]
    async fn test_ask_uses_error_field_then_fallback() {
        let relay = FakeRelay::new();
        relay.push_reply(RelayReply {
            error: Some("Question is required".to_string()),
            ..Default::default()
        });
        relay.push_reply(RelayReply::default());
        let (mut manager, _) = manager_with(relay);
        let mut target = HtmlBuffer::default();

        assert_eq!(
            manager.ask("a", &mut target).await.unwrap(),
            "Question is required"
        );
        assert_eq!(manager.ask("b", &mut target).await.unwrap(), "No response.");
    }

    #[test]
    fn test_request_context_tracks_previous_user_message() {
        let (mut manager, _) = manager_with(FakeRelay::new());
        manager.append_message(Message::user("first"));
        manager.append_message(Message::assistant("one"));
        manager.append_message(Message::user("second"));

        let request = manager.request_messages("second");
        let context: serde_json::Value =
            serde_json::from_str(request[0].content.trim_start_matches("Context JSON: ")).unwrap();

        assert_eq!(context["lastUserMessage"], "first");
        assert_eq!(context["recentMessages"].as_array().unwrap().len(), 3);
        assert_eq!(request.len(), 4);
    }

    #[test]
    fn test_request_context_window_is_bounded() {
        let (mut manager, _) = manager_with(FakeRelay::new());
        for i in 0..12 {
            manager.append_message(Message::user(format!("q{}", i)));
        }

        let request = manager.request_messages("q11");
        let context: serde_json::Value =
            serde_json::from_str(request[0].content.trim_start_matches("Context JSON: ")).unwrap();
        let recent = context["recentMessages"].as_array().unwrap();
        assert_eq!(recent.len(), CONTEXT_WINDOW);
        assert_eq!(recent[0]["content"], "q4");
    }

    #[test]
    fn test_document_replaces_latest_user_turn() {
        let (mut manager, _) = manager_with(FakeRelay::new());
        manager.attach_document(DocumentContext::new("bio.pdf", "Cells divide."));
        manager.append_message(Message::user("older"));
        manager.append_message(Message::assistant("ok"));
        manager.append_message(Message::user("Explain mitosis"));

        let request = manager.request_messages("Explain mitosis");
        assert_eq!(request[1].content, "older");
        assert_eq!(
            request[3].content,
            "Instructions:\nExplain mitosis\n\nPDF File: bio.pdf\n\nPDF Content:\nCells divide."
        );
    }

    #[tokio::test]
    async fn test_diagram_requires_answer() {
        let relay = FakeRelay::new();
        let (mut manager, _) = manager_with(relay.clone());
        let mut target = HtmlBuffer::default();

        let err = manager.diagram(&mut target).await.unwrap_err();
        assert_eq!(err, InputError::NothingToDiagram);
        assert_eq!(
            manager.status().text,
            "Please get an answer first before diagramming."
        );
        assert!(relay.calls().is_empty());
    }

    #[tokio::test]
    async fn test_diagram_wraps_reply_in_memify_block() {
        let relay = FakeRelay::new();
        relay.push_reply(RelayReply::answer("4"));
        relay.push_reply(RelayReply::answer("[2] + [2] -> [4]"));
        let (mut manager, _) = manager_with(relay.clone());
        let mut target = HtmlBuffer::default();

        manager.ask("2+2", &mut target).await.unwrap();
        let text = manager.diagram(&mut target).await.unwrap();

        assert_eq!(text, "### Memify\n\n```\n[2] + [2] -> [4]\n```");
        assert_eq!(manager.status().text, "Diagram ready.");
        assert_eq!(
            relay.calls()[1],
            RelayCall::Diagramise {
                text: "4".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_diagram_failure_reports_error() {
        let relay = FakeRelay::new();
        relay.push_failure("HTTP error! status: 502");
        let (mut manager, _) = manager_with(relay);
        manager.append_message(Message::assistant("an answer"));
        let mut target = HtmlBuffer::default();

        let text = manager.diagram(&mut target).await.unwrap();
        assert_eq!(text, "Error: HTTP error! status: 502");
        assert_eq!(manager.status().text, "Error: HTTP error! status: 502");
    }

    #[tokio::test]
    async fn test_summarize_document_appends_pdf_turn() {
        let relay = FakeRelay::new();
        relay.push_reply(RelayReply::answer("Key points"));
        let (mut manager, _) = manager_with(relay.clone());
        let mut target = HtmlBuffer::default();

        let doc = DocumentContext::new("bio.pdf", "Cells divide.");
        let summary = manager.summarize_document(&doc, &mut target).await;

        assert_eq!(summary, "Key points");
        assert_eq!(manager.active().messages[0].content, "[PDF] bio.pdf");
        assert_eq!(manager.active().title, "[PDF] bio.pdf");
        assert_eq!(manager.status().text, "PDF processed successfully!");
        match &relay.calls()[0] {
            RelayCall::Ask { question, .. } => {
                assert!(question.starts_with("Please provide a comprehensive summary"));
                assert!(question.ends_with("Cells divide."));
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_summarize_missing_file_reports_failure() {
        let relay = FakeRelay::new();
        let (mut manager, _) = manager_with(relay.clone());
        let mut target = HtmlBuffer::default();

        let text = manager
            .summarize(Path::new("/nonexistent/notes.txt"), &mut target)
            .await;

        assert!(text.starts_with("Error: "));
        assert_eq!(manager.status().text, "Failed to process PDF.");
        assert!(relay.calls().is_empty());
    }

    #[tokio::test]
    async fn test_summary_without_answer_uses_fallback() {
        let relay = FakeRelay::new();
        relay.push_reply(RelayReply::default());
        let (mut manager, _) = manager_with(relay);
        let mut target = HtmlBuffer::default();

        let doc = DocumentContext::new("a.txt", "text");
        assert_eq!(
            manager.summarize_document(&doc, &mut target).await,
            "No summary generated."
        );
    }
}
