//! Database connection module for `ClickHouse`.
//!
//! This module provides the configuration of the diagnostic connection and
//! the `ClickHouse` explain backend. A client is built for each explain
//! request and dropped as soon as the plan has been read.

use anyhow::{Context, Result};
use async_trait::async_trait;
use clickhouse::{Client, Row};
use serde::Deserialize;
use shared::explain::{ExplainBackend, ExplainError, ExplainPlan};

/// Database configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `ClickHouse` database URL (e.g., <http://localhost:8123>)
    pub url: String,
    /// Database used when a query's connection name is the default one
    pub database: String,
    /// Username for authentication
    pub user: String,
    /// Password for authentication
    pub password: String,
}

impl DatabaseConfig {
    /// Load database configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QUERYLENS_DB_URL`: Database URL (default: <http://localhost:8123>)
    /// - `QUERYLENS_DB_NAME`: Database name (default: "default")
    /// - `QUERYLENS_DB_USER`: Database user (default: "default")
    /// - `QUERYLENS_DB_PASSWORD`: Database password (default: empty)
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("QUERYLENS_DB_URL")
                .unwrap_or_else(|_| "http://localhost:8123".to_string()),
            database: std::env::var("QUERYLENS_DB_NAME").unwrap_or_else(|_| "default".to_string()),
            user: std::env::var("QUERYLENS_DB_USER").unwrap_or_else(|_| "default".to_string()),
            password: std::env::var("QUERYLENS_DB_PASSWORD").unwrap_or_default(),
        }
    }
}

/// Short-lived database client.
pub struct Database {
    client: Client,
}

impl Database {
    /// Create a new database client for `database`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use api::db::{Database, DatabaseConfig};
    /// let config = DatabaseConfig::from_env();
    /// let db = Database::new(&config, &config.database);
    /// ```
    #[must_use]
    pub fn new(config: &DatabaseConfig, database: &str) -> Self {
        let client = Client::default()
            .with_url(&config.url)
            .with_database(database)
            .with_user(&config.user)
            .with_password(&config.password);

        Self { client }
    }

    /// Runs `EXPLAIN` for `sql` and returns one line per plan step.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached or the statement
    /// cannot be explained.
    pub async fn explain(&self, sql: &str) -> Result<Vec<String>> {
        let lines = self
            .client
            .query(&format!("EXPLAIN {sql}"))
            .fetch_all::<ExplainLine>()
            .await
            .context("Failed to run EXPLAIN")?;
        Ok(lines.into_iter().map(|line| line.explain).collect())
    }
}

#[derive(Debug, Row, Deserialize)]
struct ExplainLine {
    explain: String,
}

/// Explain backend running `EXPLAIN` on `ClickHouse`.
///
/// Connection names map to database names, except the ORM's default
/// connection, which maps to the configured database.
#[derive(Debug, Clone)]
pub struct ClickHouseExplainBackend {
    config: DatabaseConfig,
    default_connection: String,
}

impl ClickHouseExplainBackend {
    /// Creates a backend for the given configuration.
    #[must_use]
    pub fn new(config: DatabaseConfig, default_connection: impl Into<String>) -> Self {
        Self {
            config,
            default_connection: default_connection.into(),
        }
    }

    fn database_for<'a>(&'a self, connection: &'a str) -> &'a str {
        if connection.is_empty() || connection == self.default_connection {
            &self.config.database
        } else {
            connection
        }
    }
}

#[async_trait]
impl ExplainBackend for ClickHouseExplainBackend {
    async fn explain_plan(&self, connection: &str, sql: &str) -> Result<ExplainPlan, ExplainError> {
        let database = self.database_for(connection);
        tracing::debug!(connection, database, "Opening diagnostic connection");

        let db = Database::new(&self.config, database);
        let lines = db
            .explain(sql)
            .await
            .map_err(|e| ExplainError::Query(format!("{e:#}")))?;

        Ok(ExplainPlan::new(
            vec!["explain".to_string()],
            lines.into_iter().map(|line| vec![line]).collect(),
        ))
    }
}
