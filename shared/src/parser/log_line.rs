//! Statement log-line parser using nom.
//!
//! Parses lines like:
//! - `Time: 0.0012 | Memory: 1,048,576 | Con: default | SELECT * FROM users`
//!
//! The parser is strictly positional: the producer always emits the time,
//! memory and connection blocks, in that order, followed by the SQL text.
//! Everything after the third outer glue is SQL, so the SQL text may itself
//! contain the outer glue.

use crate::config::DelimiterScheme;
use crate::models::{QueryRecord, QueryRecordSet};
use nom::{
    bytes::complete::{tag, take_until},
    sequence::terminated,
    IResult, Parser,
};
use thiserror::Error;

/// Labeled blocks of a log line, in producer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Elapsed time block.
    Time,
    /// Memory usage block.
    Memory,
    /// Connection name block.
    Connection,
}

impl Field {
    const ORDER: [Field; 3] = [Self::Time, Self::Memory, Self::Connection];

    fn label(self) -> &'static str {
        match self {
            Self::Time => "Time",
            Self::Memory => "Memory",
            Self::Connection => "Con",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Time => write!(f, "time"),
            Self::Memory => write!(f, "memory"),
            Self::Connection => write!(f, "connection"),
        }
    }
}

/// Errors that can occur while parsing a log line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineParseError {
    /// The line has fewer than four outer blocks.
    #[error("Expected 4 blocks separated by {glue:?}, found {found}")]
    MissingSegments {
        /// Number of blocks found.
        found: usize,
        /// The outer glue that was searched for.
        glue: String,
    },

    /// A labeled block has no inner glue.
    #[error("The {field} block has no {glue:?} separator")]
    MissingLabel {
        /// The offending block.
        field: Field,
        /// The inner glue that was searched for.
        glue: String,
    },

    /// A labeled block splits into more than a label and a value.
    #[error("The {field} block contains more than one {glue:?} separator")]
    AmbiguousField {
        /// The offending block.
        field: Field,
        /// The inner glue that was searched for.
        glue: String,
    },
}

/// Parses one log line into a `QueryRecord`.
///
/// # Errors
///
/// Returns a `LineParseError` if:
/// - The line does not contain three outer glues
/// - A labeled block does not split into exactly a label and a value
///
/// # Examples
///
/// ```
/// use shared::config::DelimiterScheme;
/// use shared::parser::parse_log_line;
///
/// let line = "Time: 0.0012 | Memory: 1,048,576 | Con: default | SELECT * FROM users WHERE id = 1";
/// let record = parse_log_line(line, &DelimiterScheme::default()).unwrap();
///
/// assert_eq!(record.connection, "default");
/// assert_eq!(record.sql, "SELECT * FROM users WHERE id = 1");
/// assert_eq!(record.time, "0.0012");
/// assert_eq!(record.memory, "1,048,576");
/// ```
pub fn parse_log_line(line: &str, scheme: &DelimiterScheme) -> Result<QueryRecord, LineParseError> {
    let outer = scheme.outer_glue.as_str();
    let inner = scheme.inner_glue.as_str();

    let mut values = [""; 3];
    let mut rest = line;
    for (index, field) in Field::ORDER.into_iter().enumerate() {
        let (remaining, raw) = block(rest, outer).map_err(|_| LineParseError::MissingSegments {
            found: index + 1,
            glue: outer.to_string(),
        })?;
        values[index] = labeled_value(raw, inner, field)?;
        rest = remaining;
    }

    let [time, memory, connection] = values;
    Ok(QueryRecord::new(connection, rest.trim(), time, memory))
}

/// Parses every line, in order, skipping malformed ones.
///
/// A skipped line is reported at `warn` level together with its position in
/// the input; the remaining records keep their relative order.
pub fn build_queries<I, S>(lines: I, scheme: &DelimiterScheme) -> QueryRecordSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .enumerate()
        .filter_map(|(position, line)| match parse_log_line(line.as_ref(), scheme) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(position, error = %e, "Skipping malformed query log line");
                None
            }
        })
        .collect()
}

/// Renders a record the way the ORM's debug logger emits it.
///
/// This is the producer side of the format `parse_log_line` reads.
///
/// # Example
///
/// ```
/// use shared::config::DelimiterScheme;
/// use shared::models::QueryRecord;
/// use shared::parser::render_log_line;
///
/// let record = QueryRecord::new("default", "SELECT 1", "0.001", "2MB");
/// assert_eq!(
///     render_log_line(&record, &DelimiterScheme::default()),
///     "Time: 0.001 | Memory: 2MB | Con: default | SELECT 1"
/// );
/// ```
#[must_use]
pub fn render_log_line(record: &QueryRecord, scheme: &DelimiterScheme) -> String {
    let outer = &scheme.outer_glue;
    let inner = &scheme.inner_glue;
    let values = [&record.time, &record.memory, &record.connection];

    let mut line = String::new();
    for (field, value) in Field::ORDER.into_iter().zip(values) {
        line.push_str(field.label());
        line.push_str(inner);
        line.push_str(value);
        line.push_str(outer);
    }
    line.push_str(&record.sql);
    line
}

// ============================================================================
// Block parsers
// ============================================================================

/// Consumes everything up to and including the next `glue`.
fn block<'a>(input: &'a str, glue: &str) -> IResult<&'a str, &'a str> {
    terminated(take_until(glue), tag(glue)).parse(input)
}

fn labeled_value<'a>(raw: &'a str, glue: &str, field: Field) -> Result<&'a str, LineParseError> {
    let (value, _label) = block(raw, glue).map_err(|_| LineParseError::MissingLabel {
        field,
        glue: glue.to_string(),
    })?;

    if value.contains(glue) {
        return Err(LineParseError::AmbiguousField {
            field,
            glue: glue.to_string(),
        });
    }

    Ok(value.trim())
}
