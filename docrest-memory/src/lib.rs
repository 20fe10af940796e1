//! In-memory document storage backend for docrest.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! [`Connection`](docrest_core::backend::Connection) and
//! [`DocumentCollection`](docrest_core::backend::DocumentCollection) traits. It
//! understands the subset of MongoDB filter syntax produced by the query
//! translator, and is meant for development, tests and small deployments.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **MongoDB-style filters** - Equality, comparison, set, `$exists`, `$regex` and logical operators
//! - **Sorting and slicing** - Honors sort, skip and limit find options
//!
//! # Quick Start
//!
//! ```ignore
//! use docrest::{prelude::*, memory::InMemoryConnection};
//! use bson::doc;
//!
//! #[derive(Model)]
//! #[model(database = "app")]
//! pub struct User;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let connection = InMemoryConnection::builder().build().await?;
//!     let manager = DocumentManager::<User, _>::new(connection, ManagerConfig::default()).await?;
//!
//!     manager.create(doc! { "name": "Alice" }).await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docrest_memory;

pub mod store;
pub(crate) mod evaluator;

pub use store::{InMemoryCollection, InMemoryConnection, InMemoryConnectionBuilder};
