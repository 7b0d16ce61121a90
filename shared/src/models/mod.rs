//! Data models for Querylens.
//!
//! This module contains the severity scale of the ORM logging hook and the
//! structured query records produced from its log lines.

pub mod query_record;
pub mod severity;

pub use query_record::{QueryRecord, QueryRecordSet};
pub use severity::Severity;
