//! Statement parameter collections.
//!
//! Statements are always prepared and then bound — parameter *values*
//! never travel inside the SQL text. Placeholder syntax at the API
//! surface is `?` for positional parameters and `:name` for named ones;
//! each backend maps that onto its native binding scheme.

use std::collections::BTreeMap;

use crate::value::Value;

/// Parameters for one statement execution.
///
/// A single scalar is shorthand for a one-element positional list, so
/// `db.read_one(sql, 42)` and `db.read_one(sql, vec![Value::Integer(42)])`
/// are equivalent.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Params {
    #[default]
    None,
    Positional(Vec<Value>),
    Named(Vec<(String, Value)>),
}

impl Params {
    pub fn positional(values: impl IntoIterator<Item = Value>) -> Self {
        Params::Positional(values.into_iter().collect())
    }

    pub fn named(pairs: impl IntoIterator<Item = (String, Value)>) -> Self {
        Params::Named(pairs.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Params::None => 0,
            Params::Positional(values) => values.len(),
            Params::Named(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<()> for Params {
    fn from(_: ()) -> Self {
        Params::None
    }
}

impl From<Value> for Params {
    fn from(value: Value) -> Self {
        Params::Positional(vec![value])
    }
}

impl From<i64> for Params {
    fn from(value: i64) -> Self {
        Params::from(Value::from(value))
    }
}

impl From<i32> for Params {
    fn from(value: i32) -> Self {
        Params::from(Value::from(value))
    }
}

impl From<f64> for Params {
    fn from(value: f64) -> Self {
        Params::from(Value::from(value))
    }
}

impl From<bool> for Params {
    fn from(value: bool) -> Self {
        Params::from(Value::from(value))
    }
}

impl From<&str> for Params {
    fn from(value: &str) -> Self {
        Params::from(Value::from(value))
    }
}

impl From<String> for Params {
    fn from(value: String) -> Self {
        Params::from(Value::from(value))
    }
}

impl From<Vec<Value>> for Params {
    fn from(values: Vec<Value>) -> Self {
        Params::Positional(values)
    }
}

impl From<&[Value]> for Params {
    fn from(values: &[Value]) -> Self {
        Params::Positional(values.to_vec())
    }
}

impl From<Vec<(String, Value)>> for Params {
    fn from(pairs: Vec<(String, Value)>) -> Self {
        Params::Named(pairs)
    }
}

impl From<Vec<(&str, Value)>> for Params {
    fn from(pairs: Vec<(&str, Value)>) -> Self {
        Params::Named(pairs.into_iter().map(|(n, v)| (n.to_string(), v)).collect())
    }
}

impl From<BTreeMap<String, Value>> for Params {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Params::Named(map.into_iter().collect())
    }
}
