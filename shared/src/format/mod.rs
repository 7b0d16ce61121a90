//! SQL presentation helpers.
//!
//! Rather than enforcing colors, formatted SQL is returned as HTML with parts
//! wrapped in `span` elements of the classes `SQLKeyword`, `SQLComment` and
//! `SQLName`, leaving styling to the panel.

mod sql;

pub use sql::{format_sql, COMMENT_CLASS, KEYWORD_CLASS, LINE_BREAK, NAME_CLASS};
