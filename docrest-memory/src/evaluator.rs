//! Query filter evaluation for in-memory document matching.
//!
//! A MongoDB filter document is first parsed into a [`Predicate`] tree, which
//! rejects unsupported operators and compiles regular expressions once. The
//! tree is then evaluated against each stored document by a
//! [`DocumentEvaluator`].
//!
//! Supported filter syntax:
//!
//! - `$and`, `$or` and `$nor` over arrays of sub-filters
//! - Dotted field paths, including numeric array indices
//! - Implicit equality, matching array elements and whole sub-documents
//! - `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`, `$in`, `$nin`, `$exists`
//! - `$regex` with `$options` (`i`, `m`, `s`, `x`) and BSON regular expression values

use std::{cmp::Ordering, collections::HashMap};
use bson::{Bson, Document, datetime::DateTime, oid::ObjectId};
use regex::{Regex, RegexBuilder};

use docrest_core::error::{ManagerError, ManagerResult};


/// Type-erased, comparable representation of BSON values.
///
/// Integers compare exactly with each other. Against a double they are widened
/// to f64, so `Int32(5)` equals `Double(5.0)`.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    DateTime(DateTime),
    ObjectId(ObjectId),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
    /// Values compared by raw BSON equality only
    Other(&'a Bson),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Integer(i64::from(*value)),
            Bson::Int64(value) => Comparable::Integer(*value),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::ObjectId(value) => Comparable::ObjectId(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
            other => Comparable::Other(other),
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Integer(a), Comparable::Integer(b)) => a == b,
            (Comparable::Integer(a), Comparable::Number(b)) => *a as f64 == *b,
            (Comparable::Number(a), Comparable::Integer(b)) => *a == *b as f64,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            (Comparable::Other(a), Comparable::Other(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Integer(a), Comparable::Integer(b)) => a.partial_cmp(b),
            (Comparable::Integer(a), Comparable::Number(b)) => (*a as f64).partial_cmp(b),
            (Comparable::Number(a), Comparable::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a.bytes().partial_cmp(&b.bytes()),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}


/// Resolves a dotted path inside `document`.
pub(crate) fn resolve_path<'d>(document: &'d Document, path: &str) -> Option<&'d Bson> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;

    for segment in segments {
        current = match current {
            Bson::Document(inner) => inner.get(segment)?,
            Bson::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}


/// A value a field is compared against.
#[derive(Debug)]
pub(crate) enum Operand {
    Value(Bson),
    Pattern(Regex),
}

impl Operand {
    fn parse(value: &Bson) -> ManagerResult<Self> {
        match value {
            Bson::RegularExpression(regex) => Ok(Operand::Pattern(
                compile_pattern(regex.pattern.as_str(), regex.options.as_str())?
            )),
            other => Ok(Operand::Value(other.clone())),
        }
    }
}

#[derive(Debug)]
pub(crate) enum FieldOp {
    Eq(Operand),
    Ne(Operand),
    Gt(Bson),
    Gte(Bson),
    Lt(Bson),
    Lte(Bson),
    In(Vec<Operand>),
    Nin(Vec<Operand>),
    Exists(bool),
    Regex(Regex),
}

/// A parsed filter.
#[derive(Debug)]
pub(crate) enum Predicate {
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Nor(Vec<Predicate>),
    Field { path: String, op: FieldOp },
}

impl Predicate {
    /// Parses a filter document. An empty filter matches every document.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::InvalidQuery`] for unsupported operators,
    /// malformed operands and invalid regular expressions.
    pub fn parse(filter: &Document) -> ManagerResult<Self> {
        let mut predicates = Vec::with_capacity(filter.len());

        for (key, value) in filter {
            match key.as_str() {
                "$and" => predicates.push(Predicate::And(Self::parse_all(key, value)?)),
                "$or" => predicates.push(Predicate::Or(Self::parse_all(key, value)?)),
                "$nor" => predicates.push(Predicate::Nor(Self::parse_all(key, value)?)),
                op if op.starts_with('$') => {
                    return Err(ManagerError::InvalidQuery(format!("unsupported top-level operator {op}")));
                },
                path => Self::parse_field(path, value, &mut predicates)?,
            }
        }

        Ok(Predicate::And(predicates))
    }

    fn parse_all(key: &str, value: &Bson) -> ManagerResult<Vec<Predicate>> {
        let Bson::Array(filters) = value else {
            return Err(ManagerError::InvalidQuery(format!("{key} expects an array of filters")));
        };

        filters
            .iter()
            .map(|filter| match filter {
                Bson::Document(filter) => Self::parse(filter),
                _ => Err(ManagerError::InvalidQuery(format!("{key} expects an array of filters"))),
            })
            .collect()
    }

    fn parse_field(path: &str, value: &Bson, predicates: &mut Vec<Predicate>) -> ManagerResult<()> {
        let operators = match value {
            Bson::Document(condition) if condition.keys().next().is_some_and(|key| key.starts_with('$')) => condition,
            _ => {
                predicates.push(Predicate::Field {
                    path: path.to_string(),
                    op: FieldOp::Eq(Operand::parse(value)?),
                });

                return Ok(());
            },
        };

        for (op, operand) in operators {
            let op = match op.as_str() {
                "$eq" => FieldOp::Eq(Operand::parse(operand)?),
                "$ne" => FieldOp::Ne(Operand::parse(operand)?),
                "$gt" => FieldOp::Gt(operand.clone()),
                "$gte" => FieldOp::Gte(operand.clone()),
                "$lt" => FieldOp::Lt(operand.clone()),
                "$lte" => FieldOp::Lte(operand.clone()),
                "$in" => FieldOp::In(Self::parse_operands(op, operand)?),
                "$nin" => FieldOp::Nin(Self::parse_operands(op, operand)?),
                "$exists" => FieldOp::Exists(is_truthy(operand)),
                "$regex" => {
                    let options = match operators.get("$options") {
                        None => "",
                        Some(Bson::String(options)) => options.as_str(),
                        Some(_) => {
                            return Err(ManagerError::InvalidQuery("$options must be a string".to_string()));
                        },
                    };

                    FieldOp::Regex(match operand {
                        Bson::String(pattern) => compile_pattern(pattern, options)?,
                        Bson::RegularExpression(regex) => compile_pattern(
                            regex.pattern.as_str(),
                            &format!("{}{options}", regex.options.as_str()),
                        )?,
                        _ => return Err(ManagerError::InvalidQuery("$regex must be a string".to_string())),
                    })
                },
                "$options" if operators.contains_key("$regex") => continue,
                other => {
                    return Err(ManagerError::InvalidQuery(format!("unsupported operator {other} on {path}")));
                },
            };

            predicates.push(Predicate::Field { path: path.to_string(), op });
        }

        Ok(())
    }

    fn parse_operands(op: &str, operand: &Bson) -> ManagerResult<Vec<Operand>> {
        match operand {
            Bson::Array(values) => values.iter().map(Operand::parse).collect(),
            _ => Err(ManagerError::InvalidQuery(format!("{op} expects an array"))),
        }
    }
}

fn compile_pattern(pattern: &str, options: &str) -> ManagerResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(options.contains('i'))
        .multi_line(options.contains('m'))
        .dot_matches_new_line(options.contains('s'))
        .ignore_whitespace(options.contains('x'))
        .build()
        .map_err(|e| ManagerError::InvalidQuery(e.to_string()))
}

fn is_truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(flag) => *flag,
        Bson::Int32(n) => *n != 0,
        Bson::Int64(n) => *n != 0,
        Bson::Double(n) => *n != 0.0,
        Bson::Null => false,
        _ => true,
    }
}


/// Evaluates predicates against a single document.
pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn evaluate(&self, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::And(predicates) => predicates.iter().all(|p| self.evaluate(p)),
            Predicate::Or(predicates) => predicates.iter().any(|p| self.evaluate(p)),
            Predicate::Nor(predicates) => !predicates.iter().any(|p| self.evaluate(p)),
            Predicate::Field { path, op } => self.visit_field(resolve_path(self.document, path), op),
        }
    }

    /// Returns the documents matching `predicate`, preserving their order.
    pub fn filter_documents(
        documents: impl IntoIterator<Item = &'a Document>,
        predicate: &Predicate,
    ) -> Vec<&'a Document> {
        documents
            .into_iter()
            .filter(|doc| DocumentEvaluator::new(doc).evaluate(predicate))
            .collect::<Vec<_>>()
    }

    fn visit_field(&self, value: Option<&Bson>, op: &FieldOp) -> bool {
        match op {
            FieldOp::Eq(operand) => matches_operand(value, operand),
            FieldOp::Ne(operand) => !matches_operand(value, operand),
            FieldOp::Gt(bound) => compares(value, bound, |ordering| ordering == Ordering::Greater),
            FieldOp::Gte(bound) => compares(value, bound, |ordering| ordering != Ordering::Less),
            FieldOp::Lt(bound) => compares(value, bound, |ordering| ordering == Ordering::Less),
            FieldOp::Lte(bound) => compares(value, bound, |ordering| ordering != Ordering::Greater),
            FieldOp::In(operands) => operands.iter().any(|operand| matches_operand(value, operand)),
            FieldOp::Nin(operands) => !operands.iter().any(|operand| matches_operand(value, operand)),
            FieldOp::Exists(should_exist) => value.is_some() == *should_exist,
            FieldOp::Regex(regex) => value.is_some_and(|value| matches_pattern(value, regex)),
        }
    }
}

/// Equality as MongoDB applies it: a missing field equals null, and an array
/// field matches if the array itself or any of its elements is equal.
fn matches_operand(value: Option<&Bson>, operand: &Operand) -> bool {
    match (value, operand) {
        (None, Operand::Value(Bson::Null)) => true,
        (None, _) => false,
        (Some(value), Operand::Pattern(regex)) => matches_pattern(value, regex),
        (Some(value), Operand::Value(expected)) => {
            let expected = Comparable::from(expected);

            Comparable::from(value) == expected
                || matches!(value, Bson::Array(items) if items.iter().any(|item| Comparable::from(item) == expected))
        },
    }
}

fn matches_pattern(value: &Bson, regex: &Regex) -> bool {
    match value {
        Bson::String(text) => regex.is_match(text),
        Bson::Array(items) => items.iter().any(|item| matches!(item, Bson::String(text) if regex.is_match(text))),
        _ => false,
    }
}

fn compares(value: Option<&Bson>, bound: &Bson, accept: impl Fn(Ordering) -> bool) -> bool {
    let bound = Comparable::from(bound);
    let check = |item: &Bson| {
        Comparable::from(item)
            .partial_cmp(&bound)
            .is_some_and(&accept)
    };

    match value {
        Some(Bson::Array(items)) => items.iter().any(check),
        Some(item) => check(item),
        None => false,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn matches(filter: Document, document: &Document) -> bool {
        let predicate = Predicate::parse(&filter).unwrap();
        DocumentEvaluator::new(document).evaluate(&predicate)
    }

    fn person() -> Document {
        doc! {
            "_id": ObjectId::parse_str("123456789012123456789012").unwrap(),
            "name": "Jack",
            "age": 55,
            "tags": ["admin", "ops"],
            "address": { "city": "NYC", "zip": "10001" },
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(matches(doc! {}, &person()));
    }

    #[test]
    fn test_equality() {
        let person = person();

        assert!(matches(doc! { "name": "Jack" }, &person));
        assert!(!matches(doc! { "name": "jack" }, &person));
        assert!(matches(doc! { "age": 55.0 }, &person));
        assert!(matches(doc! { "_id": ObjectId::parse_str("123456789012123456789012").unwrap() }, &person));
        assert!(!matches(doc! { "_id": "123456789012123456789012" }, &person));
    }

    #[test]
    fn test_equality_with_missing_field_matches_null() {
        assert!(matches(doc! { "nickname": Bson::Null }, &person()));
        assert!(!matches(doc! { "nickname": "J" }, &person()));
    }

    #[test]
    fn test_array_membership_and_subdocument_equality() {
        let person = person();

        assert!(matches(doc! { "tags": "ops" }, &person));
        assert!(matches(doc! { "tags": ["admin", "ops"] }, &person));
        assert!(matches(doc! { "address": { "city": "NYC", "zip": "10001" } }, &person));
        assert!(!matches(doc! { "address": { "city": "NYC" } }, &person));
    }

    #[test]
    fn test_dotted_paths() {
        let person = person();

        assert!(matches(doc! { "address.city": "NYC" }, &person));
        assert!(matches(doc! { "tags.1": "ops" }, &person));
        assert!(!matches(doc! { "address.city.name": "NYC" }, &person));
    }

    #[test]
    fn test_comparison_operators() {
        let person = person();

        assert!(matches(doc! { "age": { "$gt": 50 } }, &person));
        assert!(matches(doc! { "age": { "$gte": 55, "$lte": 55 } }, &person));
        assert!(!matches(doc! { "age": { "$lt": 55 } }, &person));
        assert!(!matches(doc! { "age": { "$gt": "50" } }, &person));
        assert!(matches(doc! { "age": { "$ne": 20 } }, &person));
        assert!(matches(doc! { "name": { "$eq": "Jack" } }, &person));
    }

    #[test]
    fn test_set_operators() {
        let person = person();

        assert!(matches(doc! { "name": { "$in": ["Jack", "Jim"] } }, &person));
        assert!(matches(doc! { "tags": { "$in": ["ops"] } }, &person));
        assert!(!matches(doc! { "name": { "$in": [] } }, &person));
        assert!(matches(doc! { "name": { "$nin": ["Jim"] } }, &person));
        assert!(!matches(doc! { "tags": { "$nin": ["admin"] } }, &person));
    }

    #[test]
    fn test_exists() {
        let person = person();

        assert!(matches(doc! { "name": { "$exists": true } }, &person));
        assert!(matches(doc! { "nickname": { "$exists": false } }, &person));
        assert!(!matches(doc! { "nickname": { "$exists": 1 } }, &person));
    }

    #[test]
    fn test_regex_with_options() {
        let person = person();

        assert!(matches(doc! { "name": { "$regex": "ac", "$options": "i" } }, &person));
        assert!(matches(doc! { "name": { "$regex": "JA", "$options": "i" } }, &person));
        assert!(!matches(doc! { "name": { "$regex": "JA" } }, &person));
        assert!(matches(doc! { "tags": { "$regex": "^op" } }, &person));
        assert!(!matches(doc! { "age": { "$regex": "5" } }, &person));
    }

    #[test]
    fn test_logical_operators() {
        let person = person();

        assert!(matches(doc! { "$or": [{ "name": "Jim" }, { "age": 55 }] }, &person));
        assert!(!matches(doc! { "$and": [{ "name": "Jack" }, { "age": 20 }] }, &person));
        assert!(matches(doc! { "$nor": [{ "name": "Jim" }, { "age": 20 }] }, &person));
    }

    #[test]
    fn test_rejects_unsupported_filters() {
        for filter in [
            doc! { "$where": "this.age > 1" },
            doc! { "age": { "$mod": [2, 0] } },
            doc! { "name": { "$in": "Jack" } },
            doc! { "$or": { "name": "Jack" } },
            doc! { "name": { "$regex": "(" } },
            doc! { "name": { "$options": "i" } },
        ] {
            assert!(matches!(Predicate::parse(&filter), Err(ManagerError::InvalidQuery(_))));
        }
    }

    #[test]
    fn test_comparable_ordering() {
        let low = Bson::Int32(1);
        let high = Bson::Double(1.5);

        assert_eq!(Comparable::from(&low).partial_cmp(&Comparable::from(&high)), Some(Ordering::Less));
        assert_eq!(Comparable::from(&low).partial_cmp(&Comparable::from(&Bson::String("1".into()))), None);
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        let document = doc! { "serial": 9_007_199_254_740_993_i64 };

        assert!(!matches(doc! { "serial": 9_007_199_254_740_992_i64 }, &document));
        assert!(!matches(doc! { "serial": { "$in": [9_007_199_254_740_992_i64] } }, &document));
        assert!(matches(doc! { "serial": { "$gt": 9_007_199_254_740_992_i64 } }, &document));
        assert!(matches(doc! { "serial": 9_007_199_254_740_993_i64 }, &document));
        assert!(matches(doc! { "age": 55.0 }, &doc! { "age": 55 }));
        assert!(matches(doc! { "age": { "$lt": 55.5 } }, &doc! { "age": 55_i64 }));
    }
}
