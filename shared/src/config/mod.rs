//! Configuration module for Querylens.
//!
//! This module contains the ORM parameter handle and the delimiter scheme
//! read from it.

pub mod delimiters;
pub mod orm;

pub use delimiters::{
    DelimiterError, DelimiterScheme, DEFAULT_INNER_GLUE, DEFAULT_OUTER_GLUE,
};
pub use orm::{
    OrmConfiguration, OrmContext, OrmSummary, DETAILS_CONNECTION_KEY, DETAILS_MEMORY_KEY,
    DETAILS_METHOD_KEY, DETAILS_TIME_KEY, INNER_GLUE_KEY, OUTER_GLUE_KEY,
};
