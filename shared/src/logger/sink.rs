//! Delegate sinks the query logger can forward messages to.

use crate::models::Severity;

/// A logger the query logger forwards every message to.
///
/// Implementations must be thread-safe (Send + Sync) so a single sink can be
/// shared by the loggers of concurrent requests.
pub trait LogSink: Send + Sync {
    /// Records `message` at `severity`.
    fn log(&self, severity: Severity, message: &str);
}

/// Forwards messages to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    /// Creates a new tracing sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for TracingSink {
    fn log(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Emergency | Severity::Alert | Severity::Critical | Severity::Error => {
                tracing::error!(target: "querylens::queries", %severity, "{message}");
            }
            Severity::Warning => {
                tracing::warn!(target: "querylens::queries", %severity, "{message}");
            }
            Severity::Notice | Severity::Info => {
                tracing::info!(target: "querylens::queries", %severity, "{message}");
            }
            Severity::Debug => {
                tracing::debug!(target: "querylens::queries", %severity, "{message}");
            }
        }
    }
}
