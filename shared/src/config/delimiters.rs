//! Delimiter scheme of statement log lines.

use super::orm::{OrmConfiguration, INNER_GLUE_KEY, OUTER_GLUE_KEY};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Default separator between the blocks of a log line.
pub const DEFAULT_OUTER_GLUE: &str = " | ";
/// Default separator between a field's label and its value.
pub const DEFAULT_INNER_GLUE: &str = ": ";

/// The two separators used to split a statement log line.
///
/// The outer glue separates the time, memory, connection and SQL blocks; the
/// inner glue separates a labeled block's name from its value.
///
/// # Example
///
/// ```
/// use shared::config::DelimiterScheme;
///
/// let scheme = DelimiterScheme::default();
/// assert_eq!(scheme.outer_glue, " | ");
/// assert_eq!(scheme.inner_glue, ": ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DelimiterScheme {
    /// Separator between blocks.
    #[validate(length(min = 1, message = "Outer glue cannot be empty"))]
    pub outer_glue: String,

    /// Separator between a label and its value.
    #[validate(length(min = 1, message = "Inner glue cannot be empty"))]
    pub inner_glue: String,
}

/// Errors that can occur when validating a delimiter scheme.
#[derive(Debug, Error)]
pub enum DelimiterError {
    /// One of the glues is empty.
    #[error("Invalid delimiter scheme: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    /// Both glues are the same string.
    #[error("Outer and inner glue must differ (both are {0:?})")]
    Identical(String),
}

impl DelimiterScheme {
    /// Creates a scheme from explicit separators.
    #[must_use]
    pub fn new(outer_glue: impl Into<String>, inner_glue: impl Into<String>) -> Self {
        Self {
            outer_glue: outer_glue.into(),
            inner_glue: inner_glue.into(),
        }
    }

    /// Reads the scheme from ORM configuration.
    ///
    /// Unset or empty parameters fall back to the defaults.
    #[must_use]
    pub fn from_configuration(config: &OrmConfiguration) -> Self {
        Self {
            outer_glue: glue_parameter(config, OUTER_GLUE_KEY, DEFAULT_OUTER_GLUE),
            inner_glue: glue_parameter(config, INNER_GLUE_KEY, DEFAULT_INNER_GLUE),
        }
    }

    /// Validates the scheme.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Either glue is empty
    /// - Both glues are identical
    pub fn validate_scheme(&self) -> Result<(), DelimiterError> {
        self.validate()?;
        if self.outer_glue == self.inner_glue {
            return Err(DelimiterError::Identical(self.outer_glue.clone()));
        }
        Ok(())
    }
}

impl Default for DelimiterScheme {
    fn default() -> Self {
        Self::new(DEFAULT_OUTER_GLUE, DEFAULT_INNER_GLUE)
    }
}

fn glue_parameter(config: &OrmConfiguration, key: &str, default: &str) -> String {
    let value = config.get_parameter(key, default);
    if value.is_empty() {
        tracing::warn!(key, default, "Empty delimiter parameter, using default");
        return default.to_string();
    }
    value
}
