//! Querylens Shared Library
//!
//! This crate contains the logical core of Querylens: the query logger that
//! sits behind the ORM's logging hook, the parser that turns its log lines
//! into structured records, and the SQL highlighter used by the panel.
//!
//! # Modules
//!
//! - [`logger`] - Request-scoped statement log accumulation
//! - [`parser`] - Log-line parsing into query records
//! - [`format`] - Best-effort SQL highlighting
//! - [`collector`] - Per-request data collection
//! - [`storage`] - Profile storage traits and implementations
//! - [`explain`] - Explain-plan lookups for profiled queries
//!
//! # Example
//!
//! ```
//! use shared::collector::QueryCollector;
//! use shared::config::{OrmConfiguration, OrmContext};
//! use shared::logger::{QueryLogger, StatementLogger};
//! use shared::models::Severity;
//!
//! let orm = OrmContext::new(OrmConfiguration::new(), "default");
//! let mut collector = QueryCollector::new(QueryLogger::new(), &orm).unwrap();
//! collector.logger_mut().log(
//!     "Time: 0.0012 | Memory: 1,048,576 | Con: default | SELECT * FROM users WHERE id = 1",
//!     Severity::Debug,
//! );
//!
//! let data = collector.collect();
//! assert_eq!(data.query_count(), 1);
//! assert_eq!(data.queries().get(0).unwrap().memory, "1,048,576");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collector;
pub mod config;
pub mod explain;
pub mod format;
pub mod logger;
pub mod models;
pub mod parser;
pub mod storage;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
pub use validator;
