//! MongoDB backend implementation for docrest.
//!
//! This crate implements the data-access traits on top of the official MongoDB
//! driver. Translated lookups are MongoDB filters already, so they are sent to
//! the server as they are.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! docrest = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Features
//!
//! - **Persistent storage** - Data is persisted to MongoDB Atlas or self-hosted MongoDB
//! - **Server-side querying** - Filtering, sorting, counting and slicing run on the server
//! - **Async/await** - Fully asynchronous API built on MongoDB's async driver
//!
//! # Example
//!
//! ```ignore
//! use docrest::{prelude::*, mongodb::MongoDbConnection};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let connection = MongoDbConnection::builder("mongodb://localhost:27017")
//!         .build()
//!         .await?;
//!     let manager = DocumentManager::<User, _>::new(connection, ManagerConfig::default()).await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docrest_mongodb;

pub mod store;
pub(crate) mod query;

pub use store::{MongoDbCollection, MongoDbConnection, MongoDbConnectionBuilder};
