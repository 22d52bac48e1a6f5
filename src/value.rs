//! Backend-agnostic scalar values.
//!
//! `Value` is the cell type crossing the backend boundary in both
//! directions: bound as a statement parameter on the way in, extracted
//! from a result row on the way out. Backends convert to and from their
//! native representations at the trait edge, so result processing is
//! uniform regardless of the underlying engine.

use serde::{Deserialize, Serialize};

/// A single database value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Bool(bool),
}

impl Value {
    /// Extract as i64 if the value is numeric (floats truncate).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Real(f) => Some(*f as i64),
            _ => None,
        }
    }

    /// Extract as f64 if the value is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(f) => Some(*f),
            _ => None,
        }
    }

    /// Extract as a string slice if the value is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Extract as bool if the value is boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract as a byte slice if the value is a blob.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Extract as i64, falling back to the given default.
    pub fn as_i64_or(&self, default: i64) -> i64 {
        self.as_i64().unwrap_or(default)
    }

    /// Extract as f64, falling back to the given default.
    pub fn as_f64_or(&self, default: f64) -> f64 {
        self.as_f64().unwrap_or(default)
    }

    /// Extract as an owned String, falling back to the given default.
    pub fn as_str_or(&self, default: &str) -> String {
        self.as_str().unwrap_or(default).to_string()
    }

    /// Extract as bool, falling back to the given default.
    pub fn as_bool_or(&self, default: bool) -> bool {
        self.as_bool().unwrap_or(default)
    }

    /// Type name for error messages and introspection.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
            Value::Bool(_) => "bool",
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Real(f64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_as_i64_from_integer() {
        assert_eq!(Value::Integer(42).as_i64(), Some(42));
    }

    #[rstest]
    fn test_as_i64_from_real_truncates() {
        assert_eq!(Value::Real(42.7).as_i64(), Some(42));
    }

    #[rstest]
    fn test_as_i64_from_text() {
        assert_eq!(Value::Text("42".into()).as_i64(), None);
    }

    #[rstest]
    fn test_as_f64_from_integer() {
        assert_eq!(Value::Integer(42).as_f64(), Some(42.0));
    }

    #[rstest]
    fn test_as_str_from_text() {
        assert_eq!(Value::Text("hello".into()).as_str(), Some("hello"));
    }

    #[rstest]
    fn test_as_str_from_non_text() {
        assert_eq!(Value::Integer(1).as_str(), None);
    }

    #[rstest]
    fn test_as_bool_from_non_bool() {
        assert_eq!(Value::Text("true".into()).as_bool(), None);
    }

    #[rstest]
    fn test_defaults() {
        assert_eq!(Value::Null.as_i64_or(-1), -1);
        assert_eq!(Value::Null.as_str_or("d"), "d");
        assert_eq!(Value::Null.as_bool_or(true), true);
        assert_eq!(Value::Integer(7).as_i64_or(-1), 7);
    }

    #[rstest]
    #[case(Value::Null, "null")]
    #[case(Value::Integer(1), "integer")]
    #[case(Value::Real(1.5), "real")]
    #[case(Value::Text(String::new()), "text")]
    #[case(Value::Blob(vec![]), "blob")]
    #[case(Value::Bool(false), "bool")]
    fn test_type_name(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(value.type_name(), expected);
    }

    #[rstest]
    fn test_from_option() {
        assert_eq!(Value::from(Some(3i64)), Value::Integer(3));
        assert_eq!(Value::from(Option::<i64>::None), Value::Null);
    }

    #[rstest]
    fn test_from_scalars() {
        assert_eq!(Value::from(3i32), Value::Integer(3));
        assert_eq!(Value::from("x"), Value::Text("x".into()));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(vec![1u8, 2]), Value::Blob(vec![1, 2]));
    }
}
