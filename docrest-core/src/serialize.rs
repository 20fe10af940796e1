//! Conversion of store documents into JSON-safe values.
//!
//! Every top-level document first has its `_id` moved to the configured id field
//! (as a string) and its excluded fields dropped; the result is then converted
//! recursively, turning identifiers and temporal values into canonical strings.

use base64::{Engine, engine::general_purpose::STANDARD};
use bson::{Binary, Bson, Document, spec::BinarySubtype};
use chrono::SecondsFormat;
use serde_json::{Map, Number, Value};

use crate::{
    config::{ManagerConfig, STORE_ID_KEY},
    query::display_string,
};

/// Serializes documents according to a [`ManagerConfig`].
#[derive(Debug, Clone, Copy)]
pub struct ModelSerializer<'a> {
    config: &'a ManagerConfig,
}

impl<'a> ModelSerializer<'a> {
    pub fn new(config: &'a ManagerConfig) -> Self {
        Self { config }
    }

    /// Serializes a document, an array of documents, or any other value.
    ///
    /// A top-level `null` becomes an empty object. Inside an array only the
    /// document elements get the id rename and exclusions; `null` elements stay
    /// `null`.
    pub fn serialize(&self, model: Bson) -> Value {
        match model {
            Bson::Null => Value::Object(Map::new()),
            Bson::Array(models) => Value::Array(
                models
                    .into_iter()
                    .map(|model| match model {
                        Bson::Document(document) => self.serialize_fields(document),
                        other => to_json(other),
                    })
                    .collect(),
            ),
            Bson::Document(document) => self.serialize_fields(document),
            other => to_json(other),
        }
    }

    /// Serializes a single lookup result; a miss becomes `{}`.
    pub fn serialize_document(&self, document: Option<Document>) -> Value {
        match document {
            Some(document) => self.serialize_fields(document),
            None => Value::Object(Map::new()),
        }
    }

    /// Serializes a batch of documents into a JSON array.
    pub fn serialize_documents(&self, documents: Vec<Document>) -> Value {
        Value::Array(self.serialize_each(documents))
    }

    /// Serializes each document of a batch.
    pub fn serialize_each(&self, documents: Vec<Document>) -> Vec<Value> {
        documents
            .into_iter()
            .map(|document| self.serialize_fields(document))
            .collect()
    }

    fn serialize_fields(&self, mut document: Document) -> Value {
        self.replace_id(&mut document);
        self.remove_excluded(&mut document);

        to_json(Bson::Document(document))
    }

    fn replace_id(&self, document: &mut Document) {
        if self.config.id_field.is_empty() {
            return;
        }

        if let Some(id) = document.remove(STORE_ID_KEY) {
            document.insert(self.config.id_field.clone(), display_string(&id));
        }
    }

    fn remove_excluded(&self, document: &mut Document) {
        if !self.config.has_exclusions() {
            return;
        }

        for field in &self.config.exclude_fields {
            document.remove(field);
        }
    }
}

/// Recursively converts a BSON value into its JSON-safe form.
pub fn to_json(value: Bson) -> Value {
    match value {
        Bson::Null => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(n) => Value::Number(n.into()),
        Bson::Int64(n) => Value::Number(n.into()),
        Bson::Double(n) => Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null),
        Bson::String(s) => Value::String(s),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => Value::String(dt.to_chrono().to_rfc3339_opts(SecondsFormat::Millis, true)),
        Bson::Timestamp(ts) => Value::String(format!("{}:{}", ts.time, ts.increment)),
        Bson::Decimal128(d) => Value::String(d.to_string()),
        Bson::Binary(binary) => Value::String(binary_string(&binary)),
        Bson::RegularExpression(regex) => Value::String(format!(
            "/{}/{}",
            regex.pattern.as_str(),
            regex.options.as_str()
        )),
        Bson::JavaScriptCode(code) => Value::String(code),
        Bson::JavaScriptCodeWithScope(code) => Value::String(code.code),
        Bson::Symbol(symbol) => Value::String(symbol),
        Bson::Array(values) => Value::Array(values.into_iter().map(to_json).collect()),
        Bson::Document(document) => Value::Object(
            document
                .into_iter()
                .map(|(key, value)| (key, to_json(value)))
                .collect(),
        ),
        // undefined, min/max keys and db pointers have no JSON counterpart
        _ => Value::Null,
    }
}

fn binary_string(binary: &Binary) -> String {
    if binary.subtype == BinarySubtype::Uuid {
        if let Ok(uuid) = uuid::Uuid::from_slice(&binary.bytes) {
            return uuid.hyphenated().to_string();
        }
    }

    STANDARD.encode(&binary.bytes)
}
