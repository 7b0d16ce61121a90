//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use shared::collector::CollectorError;
use shared::config::{OrmConfiguration, OrmContext};
use shared::explain::{ExplainBackend, UnsupportedExplainBackend};
use shared::logger::{LogSink, QueryLogger};
use shared::storage::{InMemoryProfileStore, ProfileStore};
use std::sync::Arc;

/// Application state shared across all request handlers.
///
/// Per-request collection state is not kept here: every profiled request gets
/// its own `QueryLogger` and collector.
#[derive(Clone)]
pub struct AppState {
    /// The profile storage backend.
    profile_store: Arc<dyn ProfileStore>,
    /// The explain-plan backend.
    explain_backend: Arc<dyn ExplainBackend>,
    /// The ORM the collectors attach to.
    orm: OrmContext,
    /// Optional sink every statement is forwarded to.
    delegate: Option<Arc<dyn LogSink>>,
}

impl AppState {
    /// Creates a new application state.
    ///
    /// # Errors
    ///
    /// Returns `CollectorError::OrmNotInitialized` if the ORM has not been
    /// initialized: no query could ever be collected.
    pub fn new(
        profile_store: Arc<dyn ProfileStore>,
        explain_backend: Arc<dyn ExplainBackend>,
        orm: OrmContext,
    ) -> Result<Self, CollectorError> {
        if !orm.is_initialized() {
            return Err(CollectorError::OrmNotInitialized);
        }

        Ok(Self {
            profile_store,
            explain_backend,
            orm,
            delegate: None,
        })
    }

    /// Creates a new application state with an in-memory profile store and
    /// no explain support.
    ///
    /// This is useful for development and testing.
    #[must_use]
    pub fn with_in_memory_store() -> Self {
        Self {
            profile_store: Arc::new(InMemoryProfileStore::new()),
            explain_backend: Arc::new(UnsupportedExplainBackend),
            orm: OrmContext::new(OrmConfiguration::new(), "default"),
            delegate: None,
        }
    }

    /// Forwards every logged statement to `delegate`.
    #[must_use]
    pub fn with_delegate(mut self, delegate: Arc<dyn LogSink>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// Replaces the explain backend.
    #[must_use]
    pub fn with_explain_backend(mut self, backend: Arc<dyn ExplainBackend>) -> Self {
        self.explain_backend = backend;
        self
    }

    /// Returns a reference to the profile store.
    #[must_use]
    pub fn profile_store(&self) -> &dyn ProfileStore {
        self.profile_store.as_ref()
    }

    /// Returns a reference to the explain backend.
    #[must_use]
    pub fn explain_backend(&self) -> &dyn ExplainBackend {
        self.explain_backend.as_ref()
    }

    /// Returns the ORM context.
    #[must_use]
    pub fn orm(&self) -> &OrmContext {
        &self.orm
    }

    /// Creates the query logger for a new request.
    #[must_use]
    pub fn new_query_logger(&self) -> QueryLogger {
        match &self.delegate {
            Some(delegate) => QueryLogger::with_delegate(Arc::clone(delegate)),
            None => QueryLogger::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_in_memory_store()
    }
}
