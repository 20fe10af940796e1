//! Convenient re-exports of commonly used types from docrest.
//!
//! ```ignore
//! use docrest::prelude::*;
//! ```
//!
//! This provides access to:
//! - The manager and its configuration
//! - The model trait and derive
//! - Data-access traits and builders
//! - Query translation, pagination and serialization types
//! - Error types

pub use docrest_core::{
    backend::{Connection, ConnectionBuilder, DocumentCollection},
    config::{ManagerConfig, ManagerConfigBuilder},
    document::ModelDocument,
    manager::{DocumentManager, DocumentManagerBuilder},
    model::{Model, ModelInfo, Namespace},
    page::{LinkMeta, LinkSet, ListMeta, PageDescriptor, PageLink, PageObject, PagePayload, PageRequest},
    query::{FindOptions, Lookup, LookupVisitor, QueryTranslator, Sort, SortDirection},
    serialize::ModelSerializer,
    error::{ManagerError, ManagerResult},
};
pub use docrest_macros::Model;
