//! Query logger.
//!
//! The ORM reports every executed statement through a logging hook. The
//! `QueryLogger` sits behind that hook for the lifetime of one request and
//! keeps every message, in arrival order, for the collector to parse.

mod query_logger;
mod sink;

pub use query_logger::{QueryLogger, StatementLogger, DELEGATE_SEVERITY};
pub use sink::{LogSink, TracingSink};
