//! Data-access abstraction consumed by the manager.
//!
//! A backend provides a [`Connection`] that resolves registered models into
//! [`DocumentCollection`] handles. The manager resolves its handle once and
//! reuses it for every operation.
//!
//! # Traits
//!
//! - [`Connection`]: registers models and hands out collection handles
//! - [`DocumentCollection`]: the find/count/write surface of one collection
//! - [`ConnectionBuilder`]: factory trait for creating connections
//!
//! # Examples
//!
//! ```ignore
//! use docrest::backend::{Connection, ConnectionBuilder, DocumentCollection};
//! use docrest::memory::InMemoryConnection;
//! use bson::doc;
//!
//! let connection = InMemoryConnection::builder().build().await?;
//! let users = connection.register(&info).await?;
//! users.insert_one(doc! { "name": "Alice" }).await?;
//! assert_eq!(users.count(doc! {}).await?, 1);
//! ```

use async_trait::async_trait;
use bson::{Bson, Document};
use std::fmt::Debug;

use crate::{error::ManagerResult, model::ModelInfo, query::FindOptions};

/// The find/count/write surface of a single collection.
///
/// Filters are MongoDB query documents as produced by
/// [`QueryTranslator`](crate::query::QueryTranslator), optionally merged with a
/// caller's raw query.
///
/// # Thread Safety
///
/// Handles may be shared by concurrent callers; implementations own their
/// synchronization.
///
/// # Error Handling
///
/// Failures are returned as [`ManagerError`](crate::error::ManagerError) and
/// are never retried by the manager.
#[async_trait]
pub trait DocumentCollection: Send + Sync + Debug {
    /// Returns the first document matching `filter`, if any.
    async fn find_one(&self, filter: Document) -> ManagerResult<Option<Document>>;

    /// Returns the documents matching `filter`, sorted and sliced per `options`.
    async fn find(&self, filter: Document, options: FindOptions) -> ManagerResult<Vec<Document>>;

    /// Counts every document matching `filter`, ignoring any slicing.
    async fn count(&self, filter: Document) -> ManagerResult<u64>;

    /// Inserts a new document and returns its `_id`.
    ///
    /// A document without `_id` is given a fresh `ObjectId`.
    async fn insert_one(&self, document: Document) -> ManagerResult<Bson>;

    /// Replaces the document stored under `id`, inserting it if absent.
    async fn upsert_one(&self, id: &Bson, document: Document) -> ManagerResult<()>;

    /// Deletes the document stored under `id`. Deleting a missing document is
    /// not an error.
    async fn delete_one(&self, id: &Bson) -> ManagerResult<()>;
}

/// A pre-established connection to a document store.
#[async_trait]
pub trait Connection: Send + Sync + Debug {
    type Collection: DocumentCollection;

    /// Registers `model` and returns the handle of its collection.
    async fn register(&self, model: &ModelInfo) -> ManagerResult<Self::Collection>;
}

#[async_trait]
pub trait ConnectionBuilder {
    type Connection: Connection;

    async fn build(self) -> ManagerResult<Self::Connection>;
}
