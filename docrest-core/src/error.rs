//! Error types and result types for manager operations.
//!
//! Use [`ManagerResult<T>`] as the return type for fallible operations. Malformed
//! identifiers in lookups are not errors; they fall back to raw equality matching
//! inside the query translator.

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors raised by the manager, the translator and the
/// data-access backends.
#[derive(Error, Debug)]
pub enum ManagerError {
    /// A configuration or document could not be read from JSON.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The manager was constructed without a connection or with an invalid configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The sort query argument is not of the `field,asc|desc` form.
    #[error("Not a valid sort option: {0}")]
    InvalidSort(String),
    /// A pagination query argument could not be read as a non-negative integer.
    /// The first argument is the query argument name, the second the offending value.
    #[error("Invalid value for query argument {0}: {1}")]
    InvalidQueryArgument(String, String),
    /// The translated query is not a document and cannot be sent to the store.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// Page count requested with a page size of zero.
    #[error("Division by zero: page size must be greater than zero")]
    ZeroPageSize,
    /// The document violates the store's structural expectations.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// A document with the given id already exists in the namespace.
    /// The first argument is the document id, the second the namespace.
    #[error("Document {0} already exists in {1}")]
    DuplicateKey(String, String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for manager operations.
pub type ManagerResult<T> = Result<T, ManagerError>;

impl From<SerdeJsonError> for ManagerError {
    fn from(err: SerdeJsonError) -> Self {
        ManagerError::Serialization(err.to_string())
    }
}
