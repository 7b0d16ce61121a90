//! Explain-plan lookups for profiled queries.
//!
//! Given a profile token and a query ordinal, `explain_query` asks an
//! `ExplainBackend` for the execution plan of that query's SQL. Failures never
//! escape as errors: they become a textual notice for the panel.

use crate::storage::ProfileStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Notice shown when the token or the query ordinal is unknown.
pub const QUERY_NOT_FOUND_NOTICE: &str = "This query does not exist.";
/// Notice shown when the backend cannot explain the query.
pub const UNAVAILABLE_NOTICE: &str = "This query cannot be explained.";

/// Errors an explain backend can report.
#[derive(Debug, Error)]
pub enum ExplainError {
    /// The backend does not support explain plans.
    #[error("Explain plans are not supported by this backend")]
    Unsupported,

    /// The diagnostic connection could not be used.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The explain statement failed.
    #[error("Explain statement failed: {0}")]
    Query(String),
}

/// Tabular explain-plan result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainPlan {
    /// Column names.
    pub columns: Vec<String>,
    /// Rows, each with one value per column.
    pub rows: Vec<Vec<String>>,
}

impl ExplainPlan {
    /// Creates a plan from column names and rows.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }
}

/// A database that can produce explain plans.
///
/// Implementations acquire a connection for the duration of a single call
/// and must not hold it afterwards.
#[async_trait]
pub trait ExplainBackend: Send + Sync {
    /// Returns the explain plan of `sql` on the connection named `connection`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be opened or the database
    /// cannot explain the statement.
    async fn explain_plan(&self, connection: &str, sql: &str) -> Result<ExplainPlan, ExplainError>;

    /// Returns false if every call is bound to fail with `Unsupported`.
    fn is_supported(&self) -> bool {
        true
    }
}

/// Backend for databases without explain support.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedExplainBackend;

#[async_trait]
impl ExplainBackend for UnsupportedExplainBackend {
    async fn explain_plan(&self, _connection: &str, _sql: &str) -> Result<ExplainPlan, ExplainError> {
        Err(ExplainError::Unsupported)
    }

    fn is_supported(&self) -> bool {
        false
    }
}

/// Result of an explain request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExplainOutcome {
    /// The plan was produced.
    Plan {
        /// Ordinal of the explained query.
        query: usize,
        /// Connection the query ran on.
        connection: String,
        /// The explained SQL.
        sql: String,
        /// The plan.
        plan: ExplainPlan,
    },
    /// The token or the query ordinal is unknown.
    QueryNotFound {
        /// Notice for display.
        message: String,
    },
    /// The backend failed to explain the query.
    Unavailable {
        /// Notice for display.
        message: String,
    },
}

/// Explains query `ordinal` of the profile `token`.
///
/// Never fails: unknown tokens and ordinals yield `QueryNotFound`, storage
/// and backend failures yield `Unavailable`.
pub async fn explain_query(
    store: &dyn ProfileStore,
    backend: &dyn ExplainBackend,
    token: &str,
    ordinal: usize,
) -> ExplainOutcome {
    let profile = match store.get(token) {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(token, error = %e, "Failed to load profile for explain");
            return unavailable();
        }
    };

    let Some(record) = profile
        .as_ref()
        .and_then(|p| p.data.queries().get(ordinal))
        .cloned()
    else {
        return ExplainOutcome::QueryNotFound {
            message: QUERY_NOT_FOUND_NOTICE.to_string(),
        };
    };

    match backend.explain_plan(&record.connection, &record.sql).await {
        Ok(plan) => ExplainOutcome::Plan {
            query: ordinal,
            connection: record.connection,
            sql: record.sql,
            plan,
        },
        Err(e) => {
            tracing::warn!(token, query = ordinal, error = %e, "Query cannot be explained");
            unavailable()
        }
    }
}

fn unavailable() -> ExplainOutcome {
    ExplainOutcome::Unavailable {
        message: UNAVAILABLE_NOTICE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::CollectedData;
    use crate::models::{QueryRecord, QueryRecordSet};
    use crate::storage::{InMemoryProfileStore, Profile};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBackend {
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ExplainBackend for FakeBackend {
        async fn explain_plan(&self, connection: &str, sql: &str) -> Result<ExplainPlan, ExplainError> {
            self.calls
                .lock()
                .unwrap()
                .push((connection.to_string(), sql.to_string()));
            Ok(ExplainPlan::new(
                vec!["explain".to_string()],
                vec![vec![format!("Scan for {sql}")]],
            ))
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl ExplainBackend for FailingBackend {
        async fn explain_plan(&self, _connection: &str, _sql: &str) -> Result<ExplainPlan, ExplainError> {
            Err(ExplainError::Query("permission denied".to_string()))
        }
    }

    fn store_with_profile() -> InMemoryProfileStore {
        let queries: QueryRecordSet = vec![
            QueryRecord::new("default", "SELECT 1", "0.1", "1"),
            QueryRecord::new("replica", "SELECT * FROM users", "0.2", "1"),
        ]
        .into();
        let store = InMemoryProfileStore::new();
        store
            .insert(Profile::new(CollectedData::new(queries)).with_token("tok"))
            .unwrap();
        store
    }

    #[test]
    fn test_explain_known_query() {
        let store = store_with_profile();
        let backend = FakeBackend::default();

        let outcome = tokio_test::block_on(explain_query(&store, &backend, "tok", 1));

        match outcome {
            ExplainOutcome::Plan {
                query,
                connection,
                sql,
                plan,
            } => {
                assert_eq!(query, 1);
                assert_eq!(connection, "replica");
                assert_eq!(sql, "SELECT * FROM users");
                assert_eq!(plan.rows, vec![vec!["Scan for SELECT * FROM users".to_string()]]);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(
            *backend.calls.lock().unwrap(),
            vec![("replica".to_string(), "SELECT * FROM users".to_string())]
        );
    }

    #[test]
    fn test_unknown_ordinal() {
        let store = store_with_profile();
        let backend = FakeBackend::default();

        let outcome = tokio_test::block_on(explain_query(&store, &backend, "tok", 2));

        assert_eq!(
            outcome,
            ExplainOutcome::QueryNotFound {
                message: QUERY_NOT_FOUND_NOTICE.to_string()
            }
        );
        assert!(backend.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_token() {
        let store = store_with_profile();

        let outcome = tokio_test::block_on(explain_query(&store, &FakeBackend::default(), "nope", 0));

        assert!(matches!(outcome, ExplainOutcome::QueryNotFound { .. }));
    }

    #[test]
    fn test_backend_failure_becomes_notice() {
        let store = store_with_profile();

        let outcome = tokio_test::block_on(explain_query(&store, &FailingBackend, "tok", 0));

        assert_eq!(
            outcome,
            ExplainOutcome::Unavailable {
                message: UNAVAILABLE_NOTICE.to_string()
            }
        );
    }

    #[test]
    fn test_unsupported_backend_becomes_notice() {
        let store = store_with_profile();

        let outcome =
            tokio_test::block_on(explain_query(&store, &UnsupportedExplainBackend, "tok", 0));

        assert!(matches!(outcome, ExplainOutcome::Unavailable { .. }));
    }

    #[test]
    fn test_backend_support_flag() {
        assert!(!UnsupportedExplainBackend.is_supported());
        assert!(FakeBackend::default().is_supported());
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let outcome = ExplainOutcome::QueryNotFound {
            message: QUERY_NOT_FOUND_NOTICE.to_string(),
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "query_not_found");
        assert_eq!(json["message"], QUERY_NOT_FOUND_NOTICE);
    }
}
