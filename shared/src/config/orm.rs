//! ORM configuration parameters.
//!
//! `OrmConfiguration` is a cheaply cloneable handle to the ORM's parameter
//! map. Every clone sees the same parameters, and reads happen at call time,
//! so a value changed after a component was built is picked up on its next
//! read.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Parameter holding the outer glue of statement log lines.
pub const OUTER_GLUE_KEY: &str = "debugpdo.logging.outerglue";
/// Parameter holding the inner glue of statement log lines.
pub const INNER_GLUE_KEY: &str = "debugpdo.logging.innerglue";
/// Enables the elapsed-time field in statement log lines.
pub const DETAILS_TIME_KEY: &str = "debugpdo.logging.details.time.enabled";
/// Enables the statement-method field in statement log lines.
pub const DETAILS_METHOD_KEY: &str = "debugpdo.logging.details.method.enabled";
/// Enables the memory field in statement log lines.
pub const DETAILS_MEMORY_KEY: &str = "debugpdo.logging.details.mem.enabled";
/// Enables the connection field in statement log lines.
pub const DETAILS_CONNECTION_KEY: &str = "debugpdo.logging.details.connection.enabled";

/// Shared handle to the ORM's configuration parameters.
///
/// # Example
///
/// ```
/// use shared::config::OrmConfiguration;
///
/// let config = OrmConfiguration::new();
/// let view = config.clone();
///
/// config.set_parameter("debugpdo.logging.outerglue", " ; ");
/// assert_eq!(view.get_parameter("debugpdo.logging.outerglue", " | "), " ; ");
/// ```
#[derive(Debug, Clone, Default)]
pub struct OrmConfiguration {
    parameters: Arc<RwLock<BTreeMap<String, String>>>,
}

impl OrmConfiguration {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration pre-filled with the given parameters.
    #[must_use]
    pub fn with_parameters<K, V>(parameters: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let map = parameters
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            parameters: Arc::new(RwLock::new(map)),
        }
    }

    /// Returns the value of `key`, or `default` when it is not set.
    #[must_use]
    pub fn get_parameter(&self, key: &str, default: &str) -> String {
        self.parameters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    /// Sets `key` to `value`, replacing any previous value.
    pub fn set_parameter(&self, key: impl Into<String>, value: impl Into<String>) {
        self.parameters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    /// Returns true if `key` is set to a truthy value (`true`, `1`, `yes`, `on`).
    #[must_use]
    pub fn is_enabled(&self, key: &str) -> bool {
        matches!(
            self.get_parameter(key, "false").to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        )
    }

    /// Returns a snapshot of every parameter, sorted by key.
    #[must_use]
    pub fn parameters(&self) -> BTreeMap<String, String> {
        self.parameters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Explicit stand-in for the ORM runtime the collector attaches to.
///
/// Holds the initialization state, the shared configuration handle and the
/// name of the default connection.
#[derive(Debug, Clone)]
pub struct OrmContext {
    initialized: bool,
    configuration: OrmConfiguration,
    default_connection: String,
    version: String,
}

impl OrmContext {
    /// Creates an initialized ORM context.
    #[must_use]
    pub fn new(configuration: OrmConfiguration, default_connection: impl Into<String>) -> Self {
        Self {
            initialized: true,
            configuration,
            default_connection: default_connection.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Creates a context for an ORM that has not been initialized yet.
    #[must_use]
    pub fn uninitialized() -> Self {
        Self {
            initialized: false,
            configuration: OrmConfiguration::new(),
            default_connection: "default".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Overrides the reported ORM version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Returns true once the ORM has been initialized.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Returns the shared configuration handle.
    #[must_use]
    pub fn configuration(&self) -> &OrmConfiguration {
        &self.configuration
    }

    /// Returns the name of the default connection.
    #[must_use]
    pub fn default_connection(&self) -> &str {
        &self.default_connection
    }

    /// Returns the ORM version string.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns a serializable summary of the ORM setup.
    #[must_use]
    pub fn summary(&self) -> OrmSummary {
        OrmSummary {
            version: self.version.clone(),
            default_connection: self.default_connection.clone(),
            parameters: self.configuration.parameters(),
        }
    }
}

/// Serializable view of the ORM setup, rendered by the configuration panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrmSummary {
    /// ORM version string.
    pub version: String,
    /// Name of the default connection.
    pub default_connection: String,
    /// All configuration parameters.
    pub parameters: BTreeMap<String, String>,
}
