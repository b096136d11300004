/// View configuration
///
/// Hosts usually keep grid settings next to the rest of their user settings,
/// so `ViewConfig` is serde-friendly and every field has a default.
///
/// # Examples
///
/// ```
/// use gridview::ViewConfig;
///
/// let config = ViewConfig::from_json(r#"{ "maxFindMatches": 100 }"#).unwrap();
/// assert_eq!(config.max_find_matches, Some(100));
/// assert!(!config.case_sensitive_search);
/// ```

use crate::error::{Result, ViewError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewConfig {
    /// Cap applied to `find` when the call does not pass its own.
    pub max_find_matches: Option<usize>,
    /// Case sensitivity of the builder's column text search.
    pub case_sensitive_search: bool,
    /// Rows to pre-allocate in the row store and filtered view.
    pub initial_capacity: usize,
}

impl ViewConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ViewError::Config(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ViewError::Config(e.to_string()))
    }

    pub fn with_max_find_matches(mut self, max: usize) -> Self {
        self.max_find_matches = Some(max);
        self
    }

    pub fn with_case_sensitive_search(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive_search = case_sensitive;
        self
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}
