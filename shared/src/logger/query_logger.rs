//! Request-scoped statement log accumulator.

use super::sink::LogSink;
use crate::models::Severity;
use std::sync::Arc;

/// Severity every message is forwarded to the delegate sink at, whatever the
/// severity it was logged with.
pub const DELEGATE_SEVERITY: Severity = Severity::Error;

/// The logging hook the ORM calls once per executed statement.
pub trait StatementLogger {
    /// Records a statement log message.
    fn log(&mut self, message: &str, severity: Severity);
}

/// Accumulates the raw statement log lines of one request.
///
/// Every message is kept regardless of its severity. When a delegate sink is
/// configured, each message is also forwarded to it at `DELEGATE_SEVERITY`.
///
/// # Example
///
/// ```
/// use shared::logger::{QueryLogger, StatementLogger};
/// use shared::models::Severity;
///
/// let mut logger = QueryLogger::new();
/// logger.log("Time: 0.1 | Memory: 1 | Con: default | SELECT 1", Severity::Debug);
/// logger.log("Time: 0.2 | Memory: 1 | Con: default | SELECT 2", Severity::Error);
///
/// assert_eq!(logger.queries().len(), 2);
/// ```
#[derive(Default)]
pub struct QueryLogger {
    delegate: Option<Arc<dyn LogSink>>,
    queries: Vec<String>,
}

impl QueryLogger {
    /// Creates a logger without a delegate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a logger that also forwards every message to `delegate`.
    #[must_use]
    pub fn with_delegate(delegate: Arc<dyn LogSink>) -> Self {
        Self {
            delegate: Some(delegate),
            queries: Vec::new(),
        }
    }

    /// Returns the accumulated lines, in arrival order.
    #[must_use]
    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    /// Returns true if a delegate sink is configured.
    #[must_use]
    pub fn has_delegate(&self) -> bool {
        self.delegate.is_some()
    }
}

impl StatementLogger for QueryLogger {
    fn log(&mut self, message: &str, _severity: Severity) {
        if let Some(delegate) = &self.delegate {
            delegate.log(DELEGATE_SEVERITY, message);
        }

        self.queries.push(message.to_string());
    }
}

impl std::fmt::Debug for QueryLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryLogger")
            .field("has_delegate", &self.has_delegate())
            .field("queries", &self.queries)
            .finish()
    }
}
