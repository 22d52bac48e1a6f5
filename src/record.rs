//! Ordered column-name → value mappings.
//!
//! A `Record` represents one row, or one to-be-persisted row. Column order
//! is significant — the CRUD façade builds column lists and placeholder
//! lists from it — so the backing store is an insertion-ordered vector,
//! not a hash map. Duplicate column names are not permitted; a repeated
//! `set` overwrites the existing value in place (last write wins, original
//! position kept).
//!
//! Callers hand records over in several native shapes; each accepted shape
//! has one adapter that normalizes into `Record` before any core logic
//! runs: tuple iterators, `BTreeMap`, JSON objects, and any `Serialize`
//! type with an object shape (`from_serialize`).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{DbError, Result};
use crate::value::Value;

/// An ordered mapping from column name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    columns: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column. Overwrites in place if the column already exists.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.columns.push((column, value)),
        }
    }

    /// Builder-style `set`.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|(c, _)| c == column)
    }

    /// Remove a column, returning its value if it was present.
    pub fn remove(&mut self, column: &str) -> Option<Value> {
        let idx = self.columns.iter().position(|(c, _)| c == column)?;
        Some(self.columns.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate columns in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(c, _)| c.as_str())
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.columns.iter().map(|(_, v)| v)
    }

    /// Normalize any `Serialize` type with an object shape into a record.
    ///
    /// Field order follows the type's serialization order. Nested arrays
    /// or objects are rejected — records hold scalars only.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self> {
        let json = serde_json::to_value(value).map_err(|e| DbError::InvalidRecord {
            message: e.to_string(),
        })?;
        Self::try_from(json)
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            record.set(column, value);
        }
        record
    }
}

impl From<Vec<(&str, Value)>> for Record {
    fn from(pairs: Vec<(&str, Value)>) -> Self {
        pairs
            .into_iter()
            .map(|(c, v)| (c.to_string(), v))
            .collect()
    }
}

impl From<BTreeMap<String, Value>> for Record {
    fn from(map: BTreeMap<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

/// JSON object adapter. Numbers become `Integer` when they fit in i64,
/// otherwise `Real`; arrays and nested objects are rejected.
impl TryFrom<serde_json::Value> for Record {
    type Error = DbError;

    fn try_from(json: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(fields) = json else {
            return Err(DbError::InvalidRecord {
                message: format!("expected a JSON object, got {}", json_kind(&json)),
            });
        };
        let mut record = Record::new();
        for (column, value) in fields {
            record.set(column, json_scalar(value)?);
        }
        Ok(record)
    }
}

fn json_scalar(json: serde_json::Value) -> Result<Value> {
    match json {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Real(f))
            } else {
                Err(DbError::InvalidRecord {
                    message: format!("number {n} does not fit a database value"),
                })
            }
        }
        serde_json::Value::String(s) => Ok(Value::Text(s)),
        other => Err(DbError::InvalidRecord {
            message: format!("field value is {}, expected a scalar", json_kind(&other)),
        }),
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a bool",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Build a [`Record`] from column/value literals.
///
/// ```
/// use quickdb::record;
/// let r = record! { "name" => "bob", "age" => 42 };
/// assert_eq!(r.len(), 2);
/// ```
#[macro_export]
macro_rules! record {
    () => { $crate::Record::new() };
    ($($column:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::Record::new();
        $( record.set($column, $value); )+
        record
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_insertion_order_preserved() {
        let record = Record::new()
            .with("zeta", 1i64)
            .with("alpha", 2i64)
            .with("mid", 3i64);
        let names: Vec<&str> = record.column_names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[rstest]
    fn test_set_overwrites_in_place() {
        let mut record = record! { "a" => 1i64, "b" => 2i64 };
        record.set("a", 10i64);
        let pairs: Vec<(&str, &Value)> = record.iter().collect();
        assert_eq!(pairs[0], ("a", &Value::Integer(10)));
        assert_eq!(pairs[1], ("b", &Value::Integer(2)));
        assert_eq!(record.len(), 2);
    }

    #[rstest]
    fn test_get_and_contains() {
        let record = record! { "name" => "bob" };
        assert_eq!(record.get("name"), Some(&Value::Text("bob".into())));
        assert!(record.contains("name"));
        assert!(!record.contains("id"));
    }

    #[rstest]
    fn test_remove() {
        let mut record = record! { "a" => 1i64, "b" => 2i64 };
        assert_eq!(record.remove("a"), Some(Value::Integer(1)));
        assert_eq!(record.remove("a"), None);
        assert_eq!(record.len(), 1);
    }

    #[rstest]
    fn test_from_btreemap() {
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), Value::Integer(2));
        map.insert("a".to_string(), Value::Integer(1));
        let record = Record::from(map);
        // BTreeMap iterates key-sorted; that order becomes insertion order
        let names: Vec<&str> = record.column_names().collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[rstest]
    fn test_from_json_object() {
        let json = serde_json::json!({ "name": "bob", "age": 42, "score": 1.5, "active": true, "note": null });
        let record = Record::try_from(json).unwrap();
        assert_eq!(record.get("name"), Some(&Value::Text("bob".into())));
        assert_eq!(record.get("age"), Some(&Value::Integer(42)));
        assert_eq!(record.get("score"), Some(&Value::Real(1.5)));
        assert_eq!(record.get("active"), Some(&Value::Bool(true)));
        assert_eq!(record.get("note"), Some(&Value::Null));
    }

    #[rstest]
    fn test_from_json_non_object_rejected() {
        let err = Record::try_from(serde_json::json!([1, 2])).unwrap_err();
        assert!(matches!(err, DbError::InvalidRecord { .. }));
    }

    #[rstest]
    fn test_from_json_nested_field_rejected() {
        let err = Record::try_from(serde_json::json!({ "tags": ["a"] })).unwrap_err();
        assert!(matches!(err, DbError::InvalidRecord { .. }));
    }

    #[rstest]
    fn test_from_serialize_struct() {
        #[derive(Serialize)]
        struct User {
            name: String,
            age: i64,
        }
        let record = Record::from_serialize(&User {
            name: "hazel".into(),
            age: 7,
        })
        .unwrap();
        let names: Vec<&str> = record.column_names().collect();
        assert_eq!(names, vec!["name", "age"]);
        assert_eq!(record.get("age"), Some(&Value::Integer(7)));
    }

    #[rstest]
    fn test_record_macro_empty() {
        assert!(record! {}.is_empty());
    }
}
