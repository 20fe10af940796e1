//! Lookup translation and find options for document stores.
//!
//! The REST layer describes what it wants with a flat lookup document. This
//! module turns that into the store's query syntax:
//!
//! - the configured id field becomes `_id`, parsed into an [`ObjectId`] when possible,
//! - keys ending with the regex suffix become case-insensitive `$regex` clauses,
//! - array values become `$in` clauses, each element translated,
//! - nested documents are translated recursively,
//! - everything else is copied verbatim.
//!
//! Each lookup entry is first classified into a [`Lookup`], then handed to a
//! [`LookupVisitor`]; [`QueryTranslator`] is the visitor emitting MongoDB syntax.
//!
//! ```ignore
//! use docrest::{config::ManagerConfig, query::QueryTranslator};
//! use bson::doc;
//!
//! let config = ManagerConfig::default();
//! let query = QueryTranslator::new(&config).translate_document(&doc! { "nameRegex": "Jo" });
//! assert_eq!(query, doc! { "name": { "$regex": "Jo", "$options": "i" } });
//! ```

use bson::{Bson, Document, doc, oid::ObjectId};

use crate::{
    config::{ManagerConfig, STORE_ID_KEY},
    error::{ManagerError, ManagerResult},
};

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

/// Sort specification for query results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    /// The field name to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self { field: field.into(), direction }
    }

    /// Parses a `field,asc|desc` specification.
    ///
    /// The field name keeps its case, so `Name,ASC` sorts on `Name`. Only the
    /// direction is compared case-insensitively; anything other than `asc`
    /// sorts descending.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::InvalidSort`] unless the input has exactly two
    /// comma-separated parts and a non-empty field.
    pub fn parse(raw: &str) -> ManagerResult<Self> {
        let parts = raw.split(',').map(str::trim).collect::<Vec<_>>();

        match parts.as_slice() {
            [field, direction] if !field.is_empty() => Ok(Sort::new(
                *field,
                if direction.eq_ignore_ascii_case("asc") {
                    SortDirection::Asc
                } else {
                    SortDirection::Desc
                },
            )),
            _ => Err(ManagerError::InvalidSort(raw.to_string())),
        }
    }

    /// Reads a sort query argument as supplied by the REST layer.
    ///
    /// `None` and `Null` mean "unsorted". A single-element array is unwrapped
    /// before parsing.
    pub fn from_query_arg(value: Option<Bson>) -> ManagerResult<Option<Self>> {
        match value {
            None | Some(Bson::Null) => Ok(None),
            Some(Bson::String(raw)) => Sort::parse(&raw).map(Some),
            Some(Bson::Array(mut values)) if values.len() == 1 => {
                Sort::from_query_arg(values.pop())
            }
            Some(other) => Err(ManagerError::InvalidSort(display_string(&other))),
        }
    }
}

/// Slicing and ordering applied to a find.
///
/// ```ignore
/// let options = FindOptions::builder()
///     .sort("name", SortDirection::Asc)
///     .skip(20)
///     .limit(10)
///     .build();
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// Sort specification for results.
    pub sort: Option<Sort>,
    /// Number of documents to skip.
    pub skip: Option<u64>,
    /// Maximum number of documents to return.
    pub limit: Option<u64>,
}

impl FindOptions {
    /// Options that fetch every matching document in store order.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> FindOptionsBuilder {
        FindOptionsBuilder::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FindOptionsBuilder {
    options: FindOptions,
}

impl FindOptionsBuilder {
    pub fn new() -> Self {
        Self { options: FindOptions::default() }
    }

    /// Sets the sort specification.
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.options.sort = Some(Sort::new(field, direction));
        self
    }

    /// Sets or clears the sort specification.
    pub fn maybe_sort(mut self, sort: Option<Sort>) -> Self {
        self.options.sort = sort;
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.options.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.options.limit = Some(limit);
        self
    }

    pub fn build(self) -> FindOptions {
        self.options
    }
}

/// A single classified lookup entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'a> {
    /// The caller-facing id field.
    Id(&'a Bson),
    /// A regex filter; `field` has the suffix stripped.
    Regex { field: &'a str, pattern: &'a Bson },
    /// An array value, matched with any-of semantics.
    AnyOf { field: &'a str, values: &'a [Bson] },
    /// A nested lookup document.
    Nested { field: &'a str, lookup: &'a Document },
    /// Anything else, matched verbatim.
    Value { field: &'a str, value: &'a Bson },
}

impl<'a> Lookup<'a> {
    /// Classifies one lookup entry. The id field takes precedence over the regex
    /// suffix, which takes precedence over the value's shape.
    pub fn classify(key: &'a str, value: &'a Bson, config: &ManagerConfig) -> Self {
        if key == config.id_field {
            return Lookup::Id(value);
        }

        if !config.regex_suffix.is_empty() {
            if let Some(field) = key.strip_suffix(config.regex_suffix.as_str()) {
                return Lookup::Regex { field, pattern: value };
            }
        }

        match value {
            Bson::Array(values) => Lookup::AnyOf { field: key, values },
            Bson::Document(lookup) => Lookup::Nested { field: key, lookup },
            _ => Lookup::Value { field: key, value },
        }
    }
}

pub trait LookupVisitor {
    type Output;

    fn visit_id(&mut self, value: &Bson) -> Self::Output;
    fn visit_regex(&mut self, field: &str, pattern: &Bson) -> Self::Output;
    fn visit_any_of(&mut self, field: &str, values: &[Bson]) -> Self::Output;
    fn visit_nested(&mut self, field: &str, lookup: &Document) -> Self::Output;
    fn visit_value(&mut self, field: &str, value: &Bson) -> Self::Output;

    fn visit_lookup(&mut self, lookup: &Lookup<'_>) -> Self::Output {
        match lookup {
            Lookup::Id(value) => self.visit_id(value),
            Lookup::Regex { field, pattern } => self.visit_regex(field, pattern),
            Lookup::AnyOf { field, values } => self.visit_any_of(field, values),
            Lookup::Nested { field, lookup } => self.visit_nested(field, lookup),
            Lookup::Value { field, value } => self.visit_value(field, value),
        }
    }
}

/// Translates lookup documents into MongoDB query documents.
#[derive(Debug, Clone, Copy)]
pub struct QueryTranslator<'a> {
    config: &'a ManagerConfig,
}

impl<'a> QueryTranslator<'a> {
    pub fn new(config: &'a ManagerConfig) -> Self {
        Self { config }
    }

    /// Translates an arbitrary lookup value.
    ///
    /// Documents are translated entry by entry. Any other value passes through
    /// unchanged, except empty ones (`null`, `""`, `[]`) which become an empty
    /// query.
    pub fn translate(&mut self, lookup: &Bson) -> Bson {
        match lookup {
            Bson::Document(lookup) => Bson::Document(self.translate_document(lookup)),
            other if is_empty_lookup(other) => Bson::Document(Document::new()),
            other => other.clone(),
        }
    }

    /// Translates a lookup document.
    pub fn translate_document(&mut self, lookup: &Document) -> Document {
        let mut query = Document::new();

        for (key, value) in lookup {
            let (field, clause) = self.visit_lookup(&Lookup::classify(key, value, self.config));
            query.insert(field, clause);
        }

        query
    }
}

impl LookupVisitor for QueryTranslator<'_> {
    type Output = (String, Bson);

    fn visit_id(&mut self, value: &Bson) -> Self::Output {
        let id = match value {
            Bson::ObjectId(oid) => Bson::ObjectId(*oid),
            Bson::String(raw) => match ObjectId::parse_str(raw) {
                Ok(oid) => Bson::ObjectId(oid),
                Err(err) => {
                    tracing::debug!(value = %raw, error = %err, "lookup id is not an ObjectId, matching raw value");
                    value.clone()
                }
            },
            other => other.clone(),
        };

        (STORE_ID_KEY.to_string(), id)
    }

    fn visit_regex(&mut self, field: &str, pattern: &Bson) -> Self::Output {
        (
            field.to_string(),
            Bson::Document(doc! { "$regex": display_string(pattern), "$options": "i" }),
        )
    }

    fn visit_any_of(&mut self, field: &str, values: &[Bson]) -> Self::Output {
        (
            field.to_string(),
            Bson::Document(doc! {
                "$in": values
                    .iter()
                    .map(|value| self.translate(value))
                    .collect::<Vec<_>>(),
            }),
        )
    }

    fn visit_nested(&mut self, field: &str, lookup: &Document) -> Self::Output {
        (field.to_string(), Bson::Document(self.translate_document(lookup)))
    }

    fn visit_value(&mut self, field: &str, value: &Bson) -> Self::Output {
        (field.to_string(), value.clone())
    }
}

fn is_empty_lookup(value: &Bson) -> bool {
    match value {
        Bson::Null => true,
        Bson::String(s) => s.is_empty(),
        Bson::Array(values) => values.is_empty(),
        Bson::Document(doc) => doc.is_empty(),
        _ => false,
    }
}

/// Plain string form of a value: strings unquoted, ObjectIds as hex.
pub(crate) fn display_string(value: &Bson) -> String {
    match value {
        Bson::String(s) => s.clone(),
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::Int32(n) => n.to_string(),
        Bson::Int64(n) => n.to_string(),
        Bson::Double(n) => n.to_string(),
        Bson::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}
