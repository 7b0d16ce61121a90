//! Statement log-line parsing.
//!
//! Turns the raw lines accumulated by the query logger into structured
//! `QueryRecord`s.
//!
//! # Example
//!
//! ```
//! use shared::config::DelimiterScheme;
//! use shared::parser::build_queries;
//!
//! let lines = ["Time: 0.5 | Memory: 1 | Con: default | SELECT 1", "not a query line"];
//! let queries = build_queries(lines, &DelimiterScheme::default());
//!
//! assert_eq!(queries.len(), 1);
//! assert_eq!(queries.total_time(), 0.5);
//! ```

mod log_line;

pub use log_line::{build_queries, parse_log_line, render_log_line, Field, LineParseError};
