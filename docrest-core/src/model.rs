//! Model descriptors.
//!
//! A manager is bound to exactly one model. The model names the database and
//! collection its documents live in; the manager resolves those names (or the
//! configured override) into a [`ModelInfo`] and registers it with the
//! connection once, at construction.
//!
//! # Example
//!
//! ```ignore
//! use docrest::Model;
//!
//! #[derive(Model)]
//! #[model(collection = "users", database = "app")]
//! pub struct User;
//! ```

use std::fmt;

use crate::{
    config::ManagerConfig,
    error::{ManagerError, ManagerResult},
};

/// Describes the documents a manager serves.
///
/// Usually implemented with `#[derive(Model)]`; the derive uses the type name
/// as the model name and the lowercased type name as the collection unless
/// `#[model(...)]` says otherwise.
pub trait Model: Send + Sync + 'static {
    /// Name the model registers under.
    fn model_name() -> &'static str;

    /// Collection holding the model's documents.
    fn collection_name() -> &'static str;

    /// Database holding the collection, if the model pins one.
    fn database_name() -> Option<&'static str>;
}

/// A fully qualified collection address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub database: String,
    pub collection: String,
}

impl Namespace {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// A model resolved against a configuration, ready for registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: String,
    pub namespace: Namespace,
}

impl ModelInfo {
    /// Resolves the namespace of `M`, preferring the configured database and
    /// collection when both are set.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Configuration`] if neither the configuration nor
    /// the model names a database.
    pub fn resolve<M: Model>(config: &ManagerConfig) -> ManagerResult<Self> {
        let namespace = match config.namespace_override() {
            Some((database, collection)) => Namespace::new(database, collection),
            None => Namespace::new(
                M::database_name().ok_or_else(|| {
                    ManagerError::Configuration(format!(
                        "model {} does not name a database and none is configured",
                        M::model_name()
                    ))
                })?,
                M::collection_name(),
            ),
        };

        Ok(Self {
            name: M::model_name().to_string(),
            namespace,
        })
    }
}
