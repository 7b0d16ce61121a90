//! Database query data collector.
//!
//! The collector is attached to one request. It owns that request's
//! `QueryLogger`, and once the request completes it turns the accumulated log
//! lines into structured records.

use crate::config::orm::{
    DETAILS_CONNECTION_KEY, DETAILS_MEMORY_KEY, DETAILS_METHOD_KEY, DETAILS_TIME_KEY,
};
use crate::config::{DelimiterScheme, OrmConfiguration, OrmContext};
use crate::logger::QueryLogger;
use crate::models::QueryRecordSet;
use crate::parser::build_queries;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name the collector is registered under in a profile.
pub const COLLECTOR_NAME: &str = "database";

/// Errors that can occur while setting up the collector.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// The ORM was not initialized when the collector was created.
    #[error(
        "ORM not initialized yet: initialize the ORM before attaching the query collector"
    )]
    OrmNotInitialized,
}

/// Data gathered by one collection pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectedData {
    queries: QueryRecordSet,
    query_count: usize,
}

impl CollectedData {
    /// Wraps a parsed record set.
    #[must_use]
    pub fn new(queries: QueryRecordSet) -> Self {
        Self {
            query_count: queries.len(),
            queries,
        }
    }

    /// Returns the parsed queries, in execution order.
    #[must_use]
    pub fn queries(&self) -> &QueryRecordSet {
        &self.queries
    }

    /// Returns the number of queries.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.query_count
    }

    /// Returns the total time of all queries, in seconds.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.queries.total_time()
    }
}

/// Collects the queries executed during one request.
///
/// # Example
///
/// ```
/// use shared::collector::QueryCollector;
/// use shared::config::{OrmConfiguration, OrmContext};
/// use shared::logger::{QueryLogger, StatementLogger};
/// use shared::models::Severity;
///
/// let orm = OrmContext::new(OrmConfiguration::new(), "default");
/// let mut collector = QueryCollector::new(QueryLogger::new(), &orm).unwrap();
///
/// collector
///     .logger_mut()
///     .log("Time: 0.25 | Memory: 1 | Con: default | SELECT 1", Severity::Debug);
///
/// let data = collector.collect();
/// assert_eq!(data.query_count(), 1);
/// assert_eq!(data.time(), 0.25);
/// ```
#[derive(Debug)]
pub struct QueryCollector {
    logger: QueryLogger,
    configuration: OrmConfiguration,
    data: CollectedData,
}

impl QueryCollector {
    /// Attaches a collector to the given ORM.
    ///
    /// Enables the time, method and memory details in the ORM's statement
    /// log lines, plus the connection detail the parser reads the connection
    /// name from.
    ///
    /// # Errors
    ///
    /// Returns `CollectorError::OrmNotInitialized` if the ORM has not been
    /// initialized.
    pub fn new(logger: QueryLogger, orm: &OrmContext) -> Result<Self, CollectorError> {
        if !orm.is_initialized() {
            return Err(CollectorError::OrmNotInitialized);
        }

        let configuration = orm.configuration().clone();
        for key in [
            DETAILS_TIME_KEY,
            DETAILS_METHOD_KEY,
            DETAILS_MEMORY_KEY,
            DETAILS_CONNECTION_KEY,
        ] {
            configuration.set_parameter(key, "true");
        }

        Ok(Self {
            logger,
            configuration,
            data: CollectedData::default(),
        })
    }

    /// Returns the collector name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        COLLECTOR_NAME
    }

    /// Returns the logger the ORM should report statements to.
    pub fn logger_mut(&mut self) -> &mut QueryLogger {
        &mut self.logger
    }

    /// Returns the logger.
    #[must_use]
    pub fn logger(&self) -> &QueryLogger {
        &self.logger
    }

    /// Parses the accumulated log lines.
    ///
    /// The delimiter scheme is read from the ORM configuration at this point,
    /// so changes made after the collector was created take effect.
    pub fn collect(&mut self) -> &CollectedData {
        let scheme = DelimiterScheme::from_configuration(&self.configuration);
        let queries = build_queries(self.logger.queries(), &scheme);

        tracing::debug!(
            lines = self.logger.queries().len(),
            queries = queries.len(),
            "Collected database queries"
        );

        self.data = CollectedData::new(queries);
        &self.data
    }

    /// Returns the data of the last collection pass.
    #[must_use]
    pub fn data(&self) -> &CollectedData {
        &self.data
    }

    /// Consumes the collector, returning the data of the last collection pass.
    #[must_use]
    pub fn into_data(self) -> CollectedData {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::orm::{INNER_GLUE_KEY, OUTER_GLUE_KEY};
    use crate::logger::StatementLogger;
    use crate::models::Severity;

    fn orm() -> OrmContext {
        OrmContext::new(OrmConfiguration::new(), "default")
    }

    #[test]
    fn test_uninitialized_orm_is_rejected() {
        let result = QueryCollector::new(QueryLogger::new(), &OrmContext::uninitialized());
        assert!(matches!(result, Err(CollectorError::OrmNotInitialized)));
    }

    #[test]
    fn test_new_enables_debug_details() {
        let orm = orm();
        let _collector = QueryCollector::new(QueryLogger::new(), &orm).unwrap();

        let config = orm.configuration();
        assert!(config.is_enabled(DETAILS_TIME_KEY));
        assert!(config.is_enabled(DETAILS_METHOD_KEY));
        assert!(config.is_enabled(DETAILS_MEMORY_KEY));
        assert!(config.is_enabled(DETAILS_CONNECTION_KEY));
    }

    #[test]
    fn test_collect_without_queries() {
        let mut collector = QueryCollector::new(QueryLogger::new(), &orm()).unwrap();

        let data = collector.collect();
        assert_eq!(data.query_count(), 0);
        assert!(data.queries().is_empty());
        assert_eq!(data.time(), 0.0);
    }

    #[test]
    fn test_collect_parses_in_order_and_counts_parsed_records() {
        let mut collector = QueryCollector::new(QueryLogger::new(), &orm()).unwrap();
        let logger = collector.logger_mut();
        logger.log("Time: 0.5 | Memory: 1 | Con: default | SELECT 1", Severity::Debug);
        logger.log("broken line", Severity::Info);
        logger.log("Time: abc | Memory: 2 | Con: replica | SELECT 2", Severity::Debug);
        logger.log("Time: 0.25 | Memory: 3 | Con: default | SELECT 3", Severity::Debug);

        let data = collector.collect();

        assert_eq!(data.query_count(), 3);
        assert_eq!(data.query_count(), data.queries().len());
        let sql: Vec<_> = data.queries().iter().map(|q| q.sql.as_str()).collect();
        assert_eq!(sql, vec!["SELECT 1", "SELECT 2", "SELECT 3"]);
        assert!((data.time() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_collect_reads_delimiters_late() {
        let orm = orm();
        let mut collector = QueryCollector::new(QueryLogger::new(), &orm).unwrap();
        collector
            .logger_mut()
            .log("t=0.1 ; m=1 ; c=main ; SELECT 1", Severity::Debug);

        assert_eq!(collector.collect().query_count(), 0);

        orm.configuration().set_parameter(OUTER_GLUE_KEY, " ; ");
        orm.configuration().set_parameter(INNER_GLUE_KEY, "=");

        let data = collector.collect();
        assert_eq!(data.query_count(), 1);
        assert_eq!(data.queries().get(0).unwrap().connection, "main");
    }

    #[test]
    fn test_collect_does_not_consume_logger() {
        let mut collector = QueryCollector::new(QueryLogger::new(), &orm()).unwrap();
        collector
            .logger_mut()
            .log("Time: 0.1 | Memory: 1 | Con: default | SELECT 1", Severity::Debug);

        collector.collect();
        collector.collect();

        assert_eq!(collector.logger().queries().len(), 1);
        assert_eq!(collector.data().query_count(), 1);
    }

    #[test]
    fn test_collected_data_serialization() {
        let mut collector = QueryCollector::new(QueryLogger::new(), &orm()).unwrap();
        collector
            .logger_mut()
            .log("Time: 0.1 | Memory: 1 | Con: default | SELECT 1", Severity::Debug);
        let data = collector.collect().clone();

        let json = serde_json::to_string(&data).unwrap();
        let parsed: CollectedData = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, data);
        assert_eq!(collector.name(), "database");
    }
}
