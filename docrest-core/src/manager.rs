//! The CRUDL manager bridging a REST resource layer and a document store.
//!
//! [`DocumentManager`] owns one connection and the collection handle of its
//! model. Each operation translates the caller's lookup, runs the store calls
//! in sequence and serializes the results; store failures propagate unchanged.
//!
//! # Example
//!
//! ```ignore
//! use docrest::{prelude::*, memory::InMemoryConnection};
//! use bson::doc;
//!
//! #[derive(Model)]
//! #[model(collection = "users", database = "app")]
//! struct User;
//!
//! let manager = DocumentManager::<User, _>::builder()
//!     .with_config(ManagerConfig::builder().with_id_field("id").build())
//!     .with_connection(InMemoryConnection::builder().build().await?)
//!     .build()
//!     .await?;
//!
//! let created = manager.create(doc! { "name": "Joe" }).await?;
//! let (page, links) = manager.retrieve_list(doc! { "size": 2, "sort": "name,asc" }, None).await?;
//! ```

use bson::{Bson, Document};
use serde_json::{Map, Value};
use std::marker::PhantomData;

use crate::{
    backend::{Connection, DocumentCollection},
    config::ManagerConfig,
    document::ModelDocument,
    error::{ManagerError, ManagerResult},
    model::{Model, ModelInfo},
    page::{LinkMeta, ListMeta, PageObject, PagePayload, PageRequest},
    query::{FindOptions, QueryTranslator},
    serialize::ModelSerializer,
};

/// Serves one model out of one collection.
pub struct DocumentManager<M: Model, C: Connection> {
    config: ManagerConfig,
    connection: C,
    info: ModelInfo,
    collection: C::Collection,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model, C: Connection> DocumentManager<M, C> {
    /// Creates a manager from a connection and a configuration.
    ///
    /// # Errors
    ///
    /// See [`DocumentManagerBuilder::build`].
    pub async fn new(connection: C, config: ManagerConfig) -> ManagerResult<Self> {
        Self::builder()
            .with_config(config)
            .with_connection(connection)
            .build()
            .await
    }

    pub fn builder() -> DocumentManagerBuilder<M, C> {
        DocumentManagerBuilder::new()
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn model_info(&self) -> &ModelInfo {
        &self.info
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn collection(&self) -> &C::Collection {
        &self.collection
    }

    pub fn serializer(&self) -> ModelSerializer<'_> {
        ModelSerializer::new(&self.config)
    }

    /// Translates a lookup value into the store's query syntax.
    pub fn translate_query(&self, lookup: &Bson) -> Bson {
        QueryTranslator::new(&self.config).translate(lookup)
    }

    /// Translates `lookup` and merges the caller's raw query over it; raw
    /// entries win on key conflicts.
    pub fn build_query(&self, lookup: &Document, raw_query: Option<Document>) -> Document {
        let mut query = QueryTranslator::new(&self.config).translate_document(lookup);

        if let Some(raw_query) = raw_query {
            for (key, value) in raw_query {
                query.insert(key, value);
            }
        }

        query
    }

    /// Inserts a new document built from `values` and returns it serialized.
    pub async fn create(&self, values: Document) -> ManagerResult<Value> {
        let mut document = ModelDocument::new(&self.collection, values);
        document.save().await?;

        tracing::debug!(namespace = %self.info.namespace, id = ?document.id(), "created document");

        Ok(self.serializer().serialize_document(Some(document.into_document())))
    }

    /// Returns the first document matching `lookup`, or `{}` when none does.
    pub async fn retrieve(&self, lookup: &Document, raw_query: Option<Document>) -> ManagerResult<Value> {
        let query = self.build_query(lookup, raw_query);
        tracing::debug!(namespace = %self.info.namespace, %query, "retrieving document");

        let document = self.collection.find_one(query).await?;

        Ok(self.serializer().serialize_document(document))
    }

    /// Returns every document matching `filters`, without pagination.
    pub async fn retrieve_all(
        &self,
        filters: &Document,
        raw_query: Option<Document>,
    ) -> ManagerResult<(Vec<Value>, ListMeta)> {
        let query = self.build_query(filters, raw_query);
        tracing::debug!(namespace = %self.info.namespace, %query, "retrieving all documents");

        let count = self.collection.count(query.clone()).await?;
        let documents = self.collection.find(query, FindOptions::new()).await?;

        Ok((self.serializer().serialize_each(documents), ListMeta { count }))
    }

    /// Returns one zero-based page of the documents matching `filters`.
    ///
    /// The page size, page number and sort arguments are taken out of `filters`
    /// before the remaining entries are translated.
    ///
    /// # Errors
    ///
    /// Fails with [`ManagerError::InvalidSort`] or
    /// [`ManagerError::InvalidQueryArgument`] for malformed arguments, and with
    /// [`ManagerError::ZeroPageSize`] when the page size is zero.
    pub async fn retrieve_list(
        &self,
        mut filters: Document,
        raw_query: Option<Document>,
    ) -> ManagerResult<(PagePayload, LinkMeta)> {
        let request = PageRequest::from_filters(&mut filters, &self.config)?;
        let query = self.build_query(&filters, raw_query);
        tracing::debug!(
            namespace = %self.info.namespace,
            %query,
            page = request.number,
            size = request.size,
            "retrieving page of documents"
        );

        let count = self.collection.count(query.clone()).await?;
        let descriptor = request.descriptor(count)?;
        let links = request.links(count)?;

        let documents = self
            .collection
            .find(query, request.find_options())
            .await?;

        Ok((
            PagePayload {
                data: self.serializer().serialize_each(documents),
                page_object: PageObject { page: descriptor },
            },
            LinkMeta { links },
        ))
    }

    /// Applies `updates` to every document matching `lookup` and returns the
    /// saved documents serialized.
    pub async fn update(&self, lookup: &Document, updates: Document) -> ManagerResult<Vec<Value>> {
        let query = self.build_query(lookup, None);
        tracing::debug!(namespace = %self.info.namespace, %query, "updating documents");

        let mut updated = Vec::new();

        for fields in self.collection.find(query, FindOptions::new()).await? {
            let mut document = ModelDocument::new(&self.collection, fields);
            document.write_fields(updates.clone());
            document.save().await?;

            updated.push(document.into_document());
        }

        Ok(self.serializer().serialize_each(updated))
    }

    /// Deletes every document matching `lookup`.
    pub async fn delete(&self, lookup: &Document) -> ManagerResult<Value> {
        let query = self.build_query(lookup, None);
        tracing::debug!(namespace = %self.info.namespace, %query, "deleting documents");

        for fields in self.collection.find(query, FindOptions::new()).await? {
            ModelDocument::new(&self.collection, fields).delete().await?;
        }

        Ok(Value::Object(Map::new()))
    }
}

/// Builder for [`DocumentManager`].
pub struct DocumentManagerBuilder<M: Model, C: Connection> {
    config: ManagerConfig,
    connection: Option<C>,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model, C: Connection> DocumentManagerBuilder<M, C> {
    pub fn new() -> Self {
        Self {
            config: ManagerConfig::default(),
            connection: None,
            _model: PhantomData,
        }
    }

    pub fn with_config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_connection(mut self, connection: C) -> Self {
        self.connection = Some(connection);
        self
    }

    /// Validates the configuration, resolves the model's namespace and
    /// registers it with the connection.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Configuration`] when no connection was given,
    /// the configuration is invalid, or no database can be resolved; any error
    /// raised by the connection while registering is returned unchanged.
    pub async fn build(self) -> ManagerResult<DocumentManager<M, C>> {
        let connection = self.connection.ok_or_else(|| {
            ManagerError::Configuration("a connection is required to build a manager".to_string())
        })?;
        self.config.validate()?;

        let info = ModelInfo::resolve::<M>(&self.config)?;
        let collection = connection.register(&info).await?;

        tracing::debug!(model = %info.name, namespace = %info.namespace, "registered model");

        Ok(DocumentManager {
            config: self.config,
            connection,
            info,
            collection,
            _model: PhantomData,
        })
    }
}

impl<M: Model, C: Connection> Default for DocumentManagerBuilder<M, C> {
    fn default() -> Self {
        Self::new()
    }
}
