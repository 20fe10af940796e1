//! Core of docrest: the adapter between a REST resource layer and a document store.
//!
//! This crate provides:
//!
//! - **Configuration** ([`config`]) - Id field, exclusions, regex suffix, pagination argument names
//! - **Model descriptors** ([`model`]) - The model/namespace a manager serves
//! - **Query translation** ([`query`]) - Lookup documents to MongoDB query syntax, sort parsing
//! - **Serialization** ([`serialize`]) - Store documents to JSON-safe values
//! - **Pagination** ([`page`]) - Page descriptors and first/prev/next/last links
//! - **Data-access abstraction** ([`backend`]) - Traits implemented by storage backends
//! - **Document handles** ([`document`]) - Read, write, save and delete stored documents
//! - **Manager** ([`manager`]) - CRUDL operations composed from the above
//! - **Error handling** ([`error`]) - Error and result types
//!
//! # Example
//!
//! ```ignore
//! use docrest::{prelude::*, memory::InMemoryConnection};
//! use bson::doc;
//!
//! #[derive(Model)]
//! #[model(collection = "users", database = "app")]
//! pub struct User;
//!
//! let manager = DocumentManager::<User, _>::new(
//!     InMemoryConnection::new(),
//!     ManagerConfig::builder().with_id_field("id").build(),
//! )
//! .await?;
//!
//! let user = manager.retrieve(&doc! { "nameRegex": "jo" }, None).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as docrest_core;

pub mod backend;
pub mod config;
pub mod document;
pub mod error;
pub mod manager;
pub mod model;
pub mod page;
pub mod query;
pub mod serialize;
