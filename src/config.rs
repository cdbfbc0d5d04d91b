//! Binder configuration.

use serde::{Deserialize, Serialize};

use crate::error::{BindError, Result};

/// Default bound on binding depth (nested nodes, lambdas and sub-filters).
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Configuration for the filter and order-by binders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    /// Maximum binding depth before failing with `RecursionLimitExceeded`.
    pub max_depth: usize,
    /// Append the element type's key members to order-by selectors.
    pub ensure_stable_ordering: bool,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            ensure_stable_ordering: false,
        }
    }
}

impl BinderConfig {
    /// Creates a new binder configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum binding depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enables or disables stable ordering.
    #[must_use]
    pub fn with_stable_ordering(mut self, enabled: bool) -> Self {
        self.ensure_stable_ordering = enabled;
        self
    }

    /// Loads a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| BindError::ConfigError(format!("Invalid binder config: {e}")))
    }
}
