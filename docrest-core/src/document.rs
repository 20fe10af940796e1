//! Live handles on stored documents.
//!
//! A [`ModelDocument`] pairs a document's fields with the collection it belongs
//! to, so callers can read and change fields and then persist or remove the
//! document without knowing the store's write API.

use bson::{Bson, Document};

use crate::{
    backend::DocumentCollection,
    config::STORE_ID_KEY,
    error::{ManagerError, ManagerResult},
};

/// A document bound to its collection.
///
/// # Example
///
/// ```ignore
/// let mut user = ModelDocument::new(&collection, doc! { "name": "Joe" });
/// user.save().await?;
/// user.write_fields(doc! { "age": 40 });
/// user.save().await?;
/// user.delete().await?;
/// ```
#[derive(Debug)]
pub struct ModelDocument<'c, C: DocumentCollection> {
    collection: &'c C,
    fields: Document,
}

impl<'c, C: DocumentCollection> ModelDocument<'c, C> {
    pub fn new(collection: &'c C, fields: Document) -> Self {
        Self { collection, fields }
    }

    /// Returns the stored identifier, present once the document has been saved.
    pub fn id(&self) -> Option<&Bson> {
        self.fields.get(STORE_ID_KEY)
    }

    pub fn read_field(&self, name: &str) -> Option<&Bson> {
        self.fields.get(name)
    }

    /// Overwrites the given fields, leaving the others untouched.
    pub fn write_fields(&mut self, fields: Document) {
        for (key, value) in fields {
            self.fields.insert(key, value);
        }
    }

    /// Persists the document: inserts it when it has no identifier yet,
    /// otherwise replaces the stored copy.
    pub async fn save(&mut self) -> ManagerResult<()> {
        match self.fields.get(STORE_ID_KEY).cloned() {
            Some(id) => self.collection.upsert_one(&id, self.fields.clone()).await,
            None => {
                let id = self.collection.insert_one(self.fields.clone()).await?;
                self.fields.insert(STORE_ID_KEY, id);

                Ok(())
            }
        }
    }

    /// Removes the document from its collection.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::InvalidDocument`] if the document was never saved.
    pub async fn delete(self) -> ManagerResult<()> {
        let id = self.fields.get(STORE_ID_KEY).ok_or_else(|| {
            ManagerError::InvalidDocument("cannot delete a document that has not been saved".to_string())
        })?;

        self.collection.delete_one(id).await
    }

    pub fn as_document(&self) -> &Document {
        &self.fields
    }

    pub fn into_document(self) -> Document {
        self.fields
    }
}
