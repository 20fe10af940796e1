//! Recording collection and connection doubles for manager tests.

use std::sync::Mutex;

use async_trait::async_trait;
use bson::{Bson, Document, oid::ObjectId};

use docrest_core::{
    backend::{Connection, DocumentCollection},
    error::{ManagerError, ManagerResult},
    model::{Model, ModelInfo},
    query::FindOptions,
};

pub const FIRST_ID: &str = "123456789012123456789011";
pub const SECOND_ID: &str = "123456789012123456789012";

pub fn oid(hex: &str) -> ObjectId {
    ObjectId::parse_str(hex).unwrap()
}

/// A model stored in `d.c`.
pub struct Account;

impl Model for Account {
    fn model_name() -> &'static str {
        "Account"
    }

    fn collection_name() -> &'static str {
        "c"
    }

    fn database_name() -> Option<&'static str> {
        Some("d")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FindOne(Document),
    Find(Document, FindOptions),
    Count(Document),
    Insert(Document),
    Upsert(Bson, Document),
    Delete(Bson),
}

/// Canned responses handed to every collection the connection registers.
#[derive(Debug, Clone, Default)]
pub struct Fixture {
    pub find_one: Option<Document>,
    pub find: Vec<Document>,
    pub count: u64,
    pub fail_with: Option<String>,
}

#[derive(Debug)]
pub struct RecordingCollection {
    fixture: Fixture,
    calls: Mutex<Vec<Call>>,
}

impl RecordingCollection {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> ManagerResult<()> {
        self.calls.lock().unwrap().push(call);

        match &self.fixture.fail_with {
            Some(message) => Err(ManagerError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentCollection for RecordingCollection {
    async fn find_one(&self, filter: Document) -> ManagerResult<Option<Document>> {
        self.record(Call::FindOne(filter))?;
        Ok(self.fixture.find_one.clone())
    }

    async fn find(&self, filter: Document, options: FindOptions) -> ManagerResult<Vec<Document>> {
        self.record(Call::Find(filter, options))?;
        Ok(self.fixture.find.clone())
    }

    async fn count(&self, filter: Document) -> ManagerResult<u64> {
        self.record(Call::Count(filter))?;
        Ok(self.fixture.count)
    }

    async fn insert_one(&self, document: Document) -> ManagerResult<Bson> {
        self.record(Call::Insert(document))?;
        Ok(Bson::ObjectId(oid(FIRST_ID)))
    }

    async fn upsert_one(&self, id: &Bson, document: Document) -> ManagerResult<()> {
        self.record(Call::Upsert(id.clone(), document))
    }

    async fn delete_one(&self, id: &Bson) -> ManagerResult<()> {
        self.record(Call::Delete(id.clone()))
    }
}

#[derive(Debug, Default)]
pub struct RecordingConnection {
    fixture: Fixture,
    registered: Mutex<Vec<ModelInfo>>,
}

impl RecordingConnection {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            fixture,
            registered: Mutex::new(Vec::new()),
        }
    }

    pub fn registered(&self) -> Vec<ModelInfo> {
        self.registered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    type Collection = RecordingCollection;

    async fn register(&self, model: &ModelInfo) -> ManagerResult<Self::Collection> {
        self.registered.lock().unwrap().push(model.clone());

        Ok(RecordingCollection {
            fixture: self.fixture.clone(),
            calls: Mutex::new(Vec::new()),
        })
    }
}
