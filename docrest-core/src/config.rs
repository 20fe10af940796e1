//! Per-manager configuration.
//!
//! [`ManagerConfig`] carries everything a resource adapter customizes: the
//! caller-facing id field, excluded fields, the regex filter suffix, the
//! pagination query-argument names and the backing namespace override.
//!
//! # Example
//!
//! ```ignore
//! use docrest::config::ManagerConfig;
//!
//! let config = ManagerConfig::builder()
//!     .with_id_field("id")
//!     .with_exclude_fields(["password_hash"])
//!     .with_default_page_size(25)
//!     .build();
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ManagerError, ManagerResult};

/// The store's reserved identifier key.
pub const STORE_ID_KEY: &str = "_id";

/// Configuration of a [`DocumentManager`](crate::manager::DocumentManager).
///
/// Every field has a default, so partial configurations deserialize:
///
/// ```ignore
/// let config: ManagerConfig = serde_json::from_str(r#"{"id_field": "id"}"#)?;
/// assert_eq!(config.regex_suffix, "Regex");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ManagerConfig {
    /// Caller-facing name of the identifier field. Lookups under this key are
    /// translated to `_id`, and serialized documents expose `_id` under it.
    /// An empty string disables the rename on serialization.
    pub id_field: String,
    /// Fields removed from every serialized document.
    pub exclude_fields: Vec<String>,
    /// Lookup keys ending with this suffix become case-insensitive regex filters.
    pub regex_suffix: String,
    /// Query argument holding the zero-based page number.
    pub page_query_arg: String,
    /// Query argument holding the page size.
    pub page_size_query_arg: String,
    /// Query argument holding the `field,asc|desc` sort specification.
    pub sort_query_arg: String,
    /// Page size used when the page size argument is absent.
    pub default_page_size: u64,
    /// Overrides the model's database when set together with `collection_name`.
    pub database_name: Option<String>,
    /// Overrides the model's collection when set together with `database_name`.
    pub collection_name: Option<String>,
}

impl ManagerConfig {
    /// Creates a new builder starting from the default configuration.
    pub fn builder() -> ManagerConfigBuilder {
        ManagerConfigBuilder::new()
    }

    /// Reads a configuration from JSON, filling absent fields with defaults,
    /// and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Serialization`] for malformed JSON and
    /// [`ManagerError::Configuration`] when [`validate`](Self::validate) fails.
    pub fn from_json(json: &str) -> ManagerResult<Self> {
        let config: ManagerConfig = serde_json::from_str(json)?;
        config.validate()?;

        Ok(config)
    }

    /// Returns `true` when serialization should drop fields.
    pub fn has_exclusions(&self) -> bool {
        !self.exclude_fields.is_empty()
    }

    /// Returns the `(database, collection)` override, present only when both
    /// names are configured.
    pub fn namespace_override(&self) -> Option<(&str, &str)> {
        match (&self.database_name, &self.collection_name) {
            (Some(database), Some(collection)) if !database.is_empty() && !collection.is_empty() => {
                Some((database.as_str(), collection.as_str()))
            }
            _ => None,
        }
    }

    /// Checks the configuration for values that would make translation or
    /// pagination meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Configuration`] when the regex suffix or a
    /// query argument name is empty, or the default page size is zero.
    pub fn validate(&self) -> ManagerResult<()> {
        if self.regex_suffix.is_empty() {
            return Err(ManagerError::Configuration(
                "regex suffix must not be empty".to_string(),
            ));
        }

        for (name, value) in [
            ("page_query_arg", &self.page_query_arg),
            ("page_size_query_arg", &self.page_size_query_arg),
            ("sort_query_arg", &self.sort_query_arg),
        ] {
            if value.is_empty() {
                return Err(ManagerError::Configuration(format!("{name} must not be empty")));
            }
        }

        if self.default_page_size == 0 {
            return Err(ManagerError::Configuration(
                "default page size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            id_field: STORE_ID_KEY.to_string(),
            exclude_fields: Vec::new(),
            regex_suffix: "Regex".to_string(),
            page_query_arg: "page".to_string(),
            page_size_query_arg: "size".to_string(),
            sort_query_arg: "sort".to_string(),
            default_page_size: 10,
            database_name: None,
            collection_name: None,
        }
    }
}

/// Builder for constructing [`ManagerConfig`] instances.
#[derive(Debug, Clone, Default)]
pub struct ManagerConfigBuilder {
    config: ManagerConfig,
}

impl ManagerConfigBuilder {
    /// Creates a new builder with every field at its default.
    pub fn new() -> Self {
        Self { config: ManagerConfig::default() }
    }

    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.config.id_field = id_field.into();
        self
    }

    pub fn with_exclude_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.exclude_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_regex_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.regex_suffix = suffix.into();
        self
    }

    /// Sets the page number, page size and sort query argument names.
    pub fn with_query_args(
        mut self,
        page: impl Into<String>,
        size: impl Into<String>,
        sort: impl Into<String>,
    ) -> Self {
        self.config.page_query_arg = page.into();
        self.config.page_size_query_arg = size.into();
        self.config.sort_query_arg = sort.into();
        self
    }

    pub fn with_default_page_size(mut self, size: u64) -> Self {
        self.config.default_page_size = size;
        self
    }

    /// Overrides the namespace the model would otherwise resolve to.
    pub fn with_namespace(mut self, database: impl Into<String>, collection: impl Into<String>) -> Self {
        self.config.database_name = Some(database.into());
        self.config.collection_name = Some(collection.into());
        self
    }

    /// Builds and returns the [`ManagerConfig`].
    pub fn build(self) -> ManagerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_paged_list_conventions() {
        let config = ManagerConfig::default();

        assert_eq!(config.id_field, "_id");
        assert_eq!(config.regex_suffix, "Regex");
        assert_eq!(config.page_query_arg, "page");
        assert_eq!(config.page_size_query_arg, "size");
        assert_eq!(config.sort_query_arg, "sort");
        assert_eq!(config.default_page_size, 10);
        assert!(!config.has_exclusions());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: ManagerConfig =
            serde_json::from_str(r#"{"id_field": "id", "exclude_fields": ["secret"]}"#).unwrap();

        assert_eq!(config.id_field, "id");
        assert_eq!(config.exclude_fields, vec!["secret".to_string()]);
        assert_eq!(config.default_page_size, 10);
        assert!(config.has_exclusions());
    }

    #[test]
    fn from_json_reads_and_validates() {
        let config = ManagerConfig::from_json(r#"{"id_field": "id", "default_page_size": 25}"#).unwrap();
        assert_eq!(config.id_field, "id");
        assert_eq!(config.default_page_size, 25);

        assert!(matches!(
            ManagerConfig::from_json(r#"{"default_page_size": "ten"}"#),
            Err(ManagerError::Serialization(_))
        ));
        assert!(matches!(
            ManagerConfig::from_json("{"),
            Err(ManagerError::Serialization(_))
        ));
        assert!(matches!(
            ManagerConfig::from_json(r#"{"regex_suffix": ""}"#),
            Err(ManagerError::Configuration(_))
        ));
    }

    #[test]
    fn namespace_override_requires_both_names() {
        let mut config = ManagerConfig::default();
        config.database_name = Some("a".to_string());
        assert_eq!(config.namespace_override(), None);

        let config = ManagerConfig::builder().with_namespace("a", "b").build();
        assert_eq!(config.namespace_override(), Some(("a", "b")));
    }

    #[test]
    fn validate_rejects_unusable_values() {
        let config = ManagerConfig::builder().with_regex_suffix("").build();
        assert!(matches!(config.validate(), Err(ManagerError::Configuration(_))));

        let config = ManagerConfig::builder().with_default_page_size(0).build();
        assert!(matches!(config.validate(), Err(ManagerError::Configuration(_))));

        let config = ManagerConfig::builder().with_query_args("page", "", "sort").build();
        assert!(matches!(config.validate(), Err(ManagerError::Configuration(_))));
    }
}
