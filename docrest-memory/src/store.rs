//! In-memory storage implementation of the data-access traits.
//!
//! Documents are kept per namespace in insertion order, behind an async-aware
//! read-write lock shared by every clone of the connection.

use std::{cmp::Ordering, collections::HashMap, sync::Arc};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::{Bson, Document, oid::ObjectId};

use docrest_core::{
    backend::{Connection, ConnectionBuilder, DocumentCollection},
    config::STORE_ID_KEY,
    error::{ManagerError, ManagerResult},
    model::{ModelInfo, Namespace},
    query::{FindOptions, SortDirection},
};

use crate::evaluator::{Comparable, DocumentEvaluator, Predicate, resolve_path};

type StoreMap = HashMap<Namespace, Vec<Document>>;


/// Thread-safe in-memory document store.
///
/// `InMemoryConnection` is cloneable and uses `Arc`-wrapped internal state;
/// clones share the same underlying data, so a manager and a test can look at
/// the same collections.
///
/// # Performance
///
/// Queries scan every document of a collection (no indexing).
///
/// # Example
///
/// ```ignore
/// use docrest_memory::InMemoryConnection;
/// use docrest::backend::{Connection, DocumentCollection};
/// use bson::doc;
///
/// let connection = InMemoryConnection::new();
/// let users = connection.register(&info).await?;
///
/// let id = users.insert_one(doc! { "name": "Alice", "age": 30 }).await?;
/// let alice = users.find_one(doc! { "_id": id }).await?;
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryConnection {
    /// namespace -> documents
    store: Arc<RwLock<StoreMap>>,
    models: Arc<RwLock<Vec<ModelInfo>>>,
}

impl InMemoryConnection {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
            models: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn builder() -> InMemoryConnectionBuilder {
        InMemoryConnectionBuilder::default()
    }

    /// Returns the models registered so far, in registration order.
    pub async fn registered_models(&self) -> Vec<ModelInfo> {
        self.models
            .read()
            .await
            .clone()
    }
}

#[async_trait]
impl Connection for InMemoryConnection {
    type Collection = InMemoryCollection;

    async fn register(&self, model: &ModelInfo) -> ManagerResult<Self::Collection> {
        {
            let mut models = self.models.write().await;

            if !models.contains(model) {
                models.push(model.clone());
            }
        }

        self.store
            .write()
            .await
            .entry(model.namespace.clone())
            .or_default();

        tracing::debug!(model = %model.name, namespace = %model.namespace, "registered in-memory collection");

        Ok(InMemoryCollection {
            namespace: model.namespace.clone(),
            store: self.store.clone(),
        })
    }
}


/// Handle on one namespace of an [`InMemoryConnection`].
#[derive(Clone, Debug)]
pub struct InMemoryCollection {
    namespace: Namespace,
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryCollection {
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }
}

#[async_trait]
impl DocumentCollection for InMemoryCollection {
    async fn find_one(&self, filter: Document) -> ManagerResult<Option<Document>> {
        let predicate = Predicate::parse(&filter)?;
        let store = self.store.read().await;

        Ok(
            store
                .get(&self.namespace)
                .and_then(|documents| {
                    DocumentEvaluator::filter_documents(documents, &predicate)
                        .first()
                        .map(|doc| (*doc).clone())
                })
        )
    }

    async fn find(&self, filter: Document, options: FindOptions) -> ManagerResult<Vec<Document>> {
        let predicate = Predicate::parse(&filter)?;
        let store = self.store.read().await;
        let documents = match store.get(&self.namespace) {
            Some(documents) => documents,
            None => return Ok(vec![]),
        };

        let mut matched = DocumentEvaluator::filter_documents(documents, &predicate);

        if let Some(sort) = &options.sort {
            matched.sort_by(|a, b| {
                let left = resolve_path(a, &sort.field)
                    .map(Comparable::from)
                    .unwrap_or(Comparable::Null);
                let right = resolve_path(b, &sort.field)
                    .map(Comparable::from)
                    .unwrap_or(Comparable::Null);

                match sort.direction {
                    SortDirection::Asc => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
                    SortDirection::Desc => right.partial_cmp(&left).unwrap_or(Ordering::Equal),
                }
            });
        }

        let skip = options.skip.map_or(0, |skip| usize::try_from(skip).unwrap_or(usize::MAX));
        let limit = options.limit.map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));

        Ok(
            matched
                .into_iter()
                .skip(skip)
                .take(limit)
                .cloned()
                .collect()
        )
    }

    async fn count(&self, filter: Document) -> ManagerResult<u64> {
        let predicate = Predicate::parse(&filter)?;
        let store = self.store.read().await;

        Ok(
            store
                .get(&self.namespace)
                .map_or(0, |documents| {
                    DocumentEvaluator::filter_documents(documents, &predicate).len() as u64
                })
        )
    }

    async fn insert_one(&self, mut document: Document) -> ManagerResult<Bson> {
        let id = match document.get(STORE_ID_KEY) {
            Some(id) => id.clone(),
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                document.insert(STORE_ID_KEY, id.clone());
                id
            },
        };

        let mut store = self.store.write().await;
        let documents = store
            .entry(self.namespace.clone())
            .or_default();

        if documents.iter().any(|doc| doc.get(STORE_ID_KEY) == Some(&id)) {
            return Err(ManagerError::DuplicateKey(id.to_string(), self.namespace.to_string()));
        }

        documents.push(document);

        Ok(id)
    }

    async fn upsert_one(&self, id: &Bson, mut document: Document) -> ManagerResult<()> {
        document.insert(STORE_ID_KEY, id.clone());

        let mut store = self.store.write().await;
        let documents = store
            .entry(self.namespace.clone())
            .or_default();

        match documents.iter_mut().find(|doc| doc.get(STORE_ID_KEY) == Some(id)) {
            Some(existing) => *existing = document,
            None => documents.push(document),
        }

        Ok(())
    }

    async fn delete_one(&self, id: &Bson) -> ManagerResult<()> {
        if let Some(documents) = self.store.write().await.get_mut(&self.namespace) {
            documents.retain(|doc| doc.get(STORE_ID_KEY) != Some(id));
        }

        Ok(())
    }
}


/// Builder for [`InMemoryConnection`] instances.
#[derive(Default)]
pub struct InMemoryConnectionBuilder;

#[async_trait]
impl ConnectionBuilder for InMemoryConnectionBuilder {
    type Connection = InMemoryConnection;

    async fn build(self) -> ManagerResult<Self::Connection> {
        Ok(InMemoryConnection::new())
    }
}
