//! Main docrest crate: a thin adapter exposing document stores to REST resources.
//!
//! This crate is the primary entry point. It re-exports the core types from the
//! sub-crates, the `Model` derive, and the storage backends.
//!
//! A [`DocumentManager`](manager::DocumentManager) serves one model. It turns a
//! resource layer's lookups into MongoDB queries, serializes stored documents
//! into JSON-safe values, and paginates lists with first/prev/next/last links.
//!
//! # Features
//!
//! - **Query translation** - Id fields to `_id`, `fieldRegex` keys to case-insensitive regexes, lists to `$in`
//! - **Serialization** - ObjectIds and other BSON-only values rendered as JSON
//! - **Pagination** - Page descriptors and links built from `page`, `size` and `sort` query arguments
//! - **Multiple backends** - In-memory and MongoDB storage behind one trait pair
//!
//! # Quick Start
//!
//! ```ignore
//! use docrest::{prelude::*, memory::InMemoryConnection};
//! use bson::doc;
//!
//! #[derive(Model)]
//! #[model(collection = "people", database = "crm")]
//! pub struct Person;
//!
//! #[tokio::main]
//! async fn main() -> ManagerResult<()> {
//!     let manager = DocumentManager::<Person, _>::new(
//!         InMemoryConnection::builder().build().await?,
//!         ManagerConfig::builder()
//!             .with_id_field("id")
//!             .with_exclude_fields(["password"])
//!             .build(),
//!     )
//!     .await?;
//!
//!     manager.create(doc! { "name": "Jack", "password": "secret" }).await?;
//!
//!     // `nameRegex` becomes a case-insensitive regex on `name`
//!     let (page, links) = manager
//!         .retrieve_list(doc! { "nameRegex": "ja", "size": 10, "sort": "name,asc" }, None)
//!         .await?;
//!
//!     println!("{}", page.into_resource_properties("people"));
//!     println!("{}", links.to_value(manager.config()));
//!
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires `mongodb` feature)

#[allow(unused_extern_crates)]
extern crate self as docrest;

pub mod prelude;

pub use docrest_core::{backend, config, document, error, manager, model, page, query, serialize};
pub use docrest_macros::Model;

// Re-export BSON and JSON types for convenience
pub use bson;
pub use serde_json;

/// In-memory storage backend implementations.
pub mod memory {
    pub use docrest_memory::{InMemoryCollection, InMemoryConnection, InMemoryConnectionBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docrest_mongodb::{MongoDbCollection, MongoDbConnection, MongoDbConnectionBuilder};
}
