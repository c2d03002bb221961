//! Test utilities for StudyQA
//!
//! This module provides common test utilities including temporary directory
//! management, a scripted relay double and assertion helpers.

use crate::client::{PlanTodo, RelayApi, RelayReply};
use crate::config::Config;
use crate::error::{Result, StudyError};
use crate::providers::ChatMessage;

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Create a test configuration with default values
pub fn test_config() -> Config {
    Config::default()
}

/// Create a test configuration YAML string
pub fn test_config_yaml() -> String {
    r#"
relay:
  host: 0.0.0.0
  port: 3100
  forward_history: true
provider:
  base_url: https://api.deepseek.com
  model: deepseek-chat
client:
  base_url: http://localhost:3100
render:
  animate: false
logging:
  level: debug
"#
    .to_string()
}

/// A call received by [`FakeRelay`]
#[derive(Debug, Clone, PartialEq)]
pub enum RelayCall {
    Ask {
        question: String,
        messages: Vec<ChatMessage>,
    },
    Diagramise {
        text: String,
    },
    Plan {
        todos: Vec<PlanTodo>,
        current_time: String,
    },
}

/// Scripted [`RelayApi`] double
///
/// Replies are returned in the order they were queued; an empty queue
/// answers with an empty [`RelayReply`].
#[derive(Default)]
pub struct FakeRelay {
    replies: Mutex<VecDeque<std::result::Result<RelayReply, String>>>,
    calls: Mutex<Vec<RelayCall>>,
}

impl FakeRelay {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_reply(&self, reply: RelayReply) {
        self.replies.lock().unwrap().push_back(Ok(reply));
    }

    /// Queue a transport-level failure with the given message
    pub fn push_failure(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn calls(&self) -> Vec<RelayCall> {
        self.calls.lock().unwrap().clone()
    }

    fn respond(&self, call: RelayCall) -> Result<RelayReply> {
        self.calls.lock().unwrap().push(call);
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(StudyError::Relay(message).into()),
            None => Ok(RelayReply::default()),
        }
    }
}

#[async_trait]
impl RelayApi for FakeRelay {
    async fn ask(&self, question: &str, messages: &[ChatMessage]) -> Result<RelayReply> {
        self.respond(RelayCall::Ask {
            question: question.to_string(),
            messages: messages.to_vec(),
        })
    }

    async fn diagramise(&self, text: &str) -> Result<RelayReply> {
        self.respond(RelayCall::Diagramise {
            text: text.to_string(),
        })
    }

    async fn plan(&self, todos: &[PlanTodo], current_time: &str) -> Result<RelayReply> {
        self.respond(RelayCall::Plan {
            todos: todos.to_vec(),
            current_time: current_time.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[test]
    fn test_test_config_yaml_parses() {
        let config = Config::from_yaml(&test_config_yaml()).unwrap();
        assert_eq!(config.relay.port, 3100);
        assert!(config.relay.forward_history);
        assert!(!config.render.animate);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_fake_relay_replays_queue() {
        let relay = FakeRelay::new();
        relay.push_reply(RelayReply::answer("4"));
        relay.push_failure("HTTP error! status: 500");

        assert_eq!(relay.ask("2+2", &[]).await.unwrap().answer.as_deref(), Some("4"));
        assert!(relay.diagramise("x").await.is_err());
        assert_eq!(relay.plan(&[], "now").await.unwrap(), RelayReply::default());
        assert_eq!(relay.calls().len(), 3);
    }
}
