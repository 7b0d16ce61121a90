//! Structured query records.
//!
//! A `QueryRecord` is the parsed form of one statement log line. Records are
//! kept in a `QueryRecordSet` whose ordinal index is the stable identifier of
//! "the Nth query of this request".

use nom::{
    branch::alt,
    character::complete::{char, digit0, digit1, one_of},
    combinator::{opt, recognize},
    number::complete::double,
    IResult, Parser,
};
use serde::{Deserialize, Serialize};

/// One executed statement, as reported by the ORM's debug logger.
///
/// All fields are opaque strings; `time` and `memory` are kept exactly as the
/// producer formatted them.
///
/// # Example
///
/// ```
/// use shared::models::QueryRecord;
///
/// let record = QueryRecord::new("default", "SELECT 1", "0.0012", "1,048,576");
/// assert_eq!(record.elapsed_seconds(), 0.0012);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRecord {
    /// Name of the connection the statement ran on.
    pub connection: String,
    /// The SQL text, trimmed.
    pub sql: String,
    /// Elapsed time as reported by the producer.
    pub time: String,
    /// Memory usage as reported by the producer.
    pub memory: String,
}

impl QueryRecord {
    /// Creates a new record.
    #[must_use]
    pub fn new(
        connection: impl Into<String>,
        sql: impl Into<String>,
        time: impl Into<String>,
        memory: impl Into<String>,
    ) -> Self {
        Self {
            connection: connection.into(),
            sql: sql.into(),
            time: time.into(),
            memory: memory.into(),
        }
    }

    /// Returns the elapsed time as a number of seconds.
    ///
    /// Only the leading numeric prefix of `time` is considered, so a value such
    /// as `"0.002 sec"` yields `0.002`. Values without a numeric prefix, and
    /// non-finite values, yield `0.0`.
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        leading_number(&self.time)
    }
}

fn leading_number(value: &str) -> f64 {
    let value = value.trim_start();
    let number = match double::<&str, nom::error::Error<&str>>(value) {
        Ok((_, number)) => number,
        // a dangling exponent such as "0.5e" still has a usable mantissa
        Err(_) => match mantissa(value) {
            Ok((_, digits)) => digits.parse().unwrap_or(0.0),
            Err(_) => 0.0,
        },
    };

    if number.is_finite() {
        number
    } else {
        0.0
    }
}

fn mantissa(input: &str) -> IResult<&str, &str> {
    recognize((
        opt(one_of("+-")),
        alt((
            recognize((digit1, opt((char('.'), digit0)))),
            recognize((char('.'), digit1)),
        )),
    ))
    .parse(input)
}

/// Ordered set of query records for one request.
///
/// Index order equals execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryRecordSet {
    records: Vec<QueryRecord>,
}

impl QueryRecordSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record at the next ordinal.
    pub fn push(&mut self, record: QueryRecord) {
        self.records.push(record);
    }

    /// Returns the record at `ordinal`, if any.
    #[must_use]
    pub fn get(&self, ordinal: usize) -> Option<&QueryRecord> {
        self.records.get(ordinal)
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the set holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over the records in execution order.
    pub fn iter(&self) -> std::slice::Iter<'_, QueryRecord> {
        self.records.iter()
    }

    /// Returns the records as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[QueryRecord] {
        &self.records
    }

    /// Sums the elapsed time of every record, in seconds.
    ///
    /// Records whose time is not numeric contribute nothing.
    #[must_use]
    pub fn total_time(&self) -> f64 {
        self.records
            .iter()
            .fold(0.0, |total, record| total + record.elapsed_seconds())
    }
}

impl From<Vec<QueryRecord>> for QueryRecordSet {
    fn from(records: Vec<QueryRecord>) -> Self {
        Self { records }
    }
}

impl FromIterator<QueryRecord> for QueryRecordSet {
    fn from_iter<I: IntoIterator<Item = QueryRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a QueryRecordSet {
    type Item = &'a QueryRecord;
    type IntoIter = std::slice::Iter<'a, QueryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
