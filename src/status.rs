//! Status line shared by the conversation and todo managers

use std::fmt;
use std::sync::Arc;

/// Current status text and whether work is in flight
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub loading: bool,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Callback invoked on every status change
pub type StatusReporter = Arc<dyn Fn(&Status) + Send + Sync>;

/// Holds the latest status and forwards changes to an optional reporter
#[derive(Clone, Default)]
pub struct StatusLine {
    current: Status,
    reporter: Option<StatusReporter>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_reporter(&mut self, reporter: StatusReporter) {
        self.reporter = Some(reporter);
    }

    /// Settled status
    pub fn set(&mut self, text: impl Into<String>) {
        self.update(text.into(), false);
    }

    /// Status for work still in progress
    pub fn loading(&mut self, text: impl Into<String>) {
        self.update(text.into(), true);
    }

    pub fn current(&self) -> &Status {
        &self.current
    }

    fn update(&mut self, text: String, loading: bool) {
        tracing::debug!(status = %text, loading, "Status changed");
        self.current = Status { text, loading };
        if let Some(reporter) = &self.reporter {
            reporter(&self.current);
        }
    }
}

impl fmt::Debug for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusLine")
            .field("current", &self.current)
            .field("reporter", &self.reporter.is_some())
            .finish()
    }
}
