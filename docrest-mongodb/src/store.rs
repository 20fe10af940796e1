use async_trait::async_trait;
use futures::TryStreamExt;
use bson::{Bson, Document, doc};
use mongodb::{
    Client, Collection as MongoCollection,
    options::ClientOptions,
};
use docrest_core::{
    backend::{Connection, ConnectionBuilder, DocumentCollection},
    config::STORE_ID_KEY,
    error::{ManagerError, ManagerResult},
    model::{ModelInfo, Namespace},
    query::FindOptions,
};

use crate::query::find_options;


#[derive(Debug, Clone)]
pub struct MongoDbConnection {
    client: Client,
}

impl MongoDbConnection {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn builder(dsn: &str) -> MongoDbConnectionBuilder {
        MongoDbConnectionBuilder::new(dsn)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn shutdown(self) -> ManagerResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

#[async_trait]
impl Connection for MongoDbConnection {
    type Collection = MongoDbCollection;

    async fn register(&self, model: &ModelInfo) -> ManagerResult<Self::Collection> {
        tracing::debug!(model = %model.name, namespace = %model.namespace, "registered mongodb collection");

        Ok(MongoDbCollection {
            namespace: model.namespace.clone(),
            inner: self.client
                .database(&model.namespace.database)
                .collection::<Document>(&model.namespace.collection),
        })
    }
}


#[derive(Debug, Clone)]
pub struct MongoDbCollection {
    namespace: Namespace,
    inner: MongoCollection<Document>,
}

impl MongoDbCollection {
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }
}

#[async_trait]
impl DocumentCollection for MongoDbCollection {
    async fn find_one(&self, filter: Document) -> ManagerResult<Option<Document>> {
        self.inner
            .find_one(filter)
            .await
            .map_err(|e| ManagerError::Backend(e.to_string()))
    }

    async fn find(&self, filter: Document, options: FindOptions) -> ManagerResult<Vec<Document>> {
        self.inner
            .find(filter)
            .with_options(find_options(&options))
            .await
            .map_err(|e| ManagerError::Backend(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| ManagerError::Backend(e.to_string()))
    }

    async fn count(&self, filter: Document) -> ManagerResult<u64> {
        self.inner
            .count_documents(filter)
            .await
            .map_err(|e| ManagerError::Backend(e.to_string()))
    }

    async fn insert_one(&self, document: Document) -> ManagerResult<Bson> {
        Ok(
            self.inner
                .insert_one(document)
                .await
                .map_err(|e| ManagerError::Backend(e.to_string()))?
                .inserted_id
        )
    }

    async fn upsert_one(&self, id: &Bson, document: Document) -> ManagerResult<()> {
        self.inner
            .replace_one(doc! { STORE_ID_KEY: id.clone() }, document)
            .upsert(true)
            .await
            .map_err(|e| ManagerError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn delete_one(&self, id: &Bson) -> ManagerResult<()> {
        self.inner
            .delete_one(doc! { STORE_ID_KEY: id.clone() })
            .await
            .map_err(|e| ManagerError::Backend(e.to_string()))?;

        Ok(())
    }
}

pub struct MongoDbConnectionBuilder {
    dsn: String,
    app_name: Option<String>,
}

impl MongoDbConnectionBuilder {
    pub fn new(dsn: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            app_name: None,
        }
    }

    pub fn with_app_name(mut self, app_name: &str) -> Self {
        self.app_name = Some(app_name.to_string());
        self
    }
}

#[async_trait]
impl ConnectionBuilder for MongoDbConnectionBuilder {
    type Connection = MongoDbConnection;

    async fn build(self) -> ManagerResult<Self::Connection> {
        let mut options = ClientOptions::parse(&self.dsn)
            .await
            .map_err(|e| ManagerError::Configuration(e.to_string()))?;

        if self.app_name.is_some() {
            options.app_name = self.app_name;
        }

        Ok(MongoDbConnection::new(
            Client::with_options(options)
                .map_err(|e| ManagerError::Configuration(e.to_string()))?,
        ))
    }
}
