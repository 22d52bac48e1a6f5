//! Executed-statement results and result shaping.
//!
//! The shape handed back to the caller is decided purely from the
//! executed statement's own column metadata — how many columns came back
//! and which retrieval mode was requested — never from caller hints, so
//! callers cannot lie about shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DbError, Result};
use crate::record::Record;
use crate::value::Value;

/// How multi-column rows are materialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowShape {
    /// Ordered column-name → value mapping (the default).
    #[default]
    Record,
    /// Key-sorted associative map.
    Map,
    /// Values only, in column order.
    Tuple,
}

/// One materialized multi-column row.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Record(Record),
    Map(BTreeMap<String, Value>),
    Tuple(Vec<Value>),
}

impl Row {
    /// Look up a column by name. `None` for tuple-shaped rows, which
    /// carry no column names.
    pub fn get(&self, column: &str) -> Option<&Value> {
        match self {
            Row::Record(record) => record.get(column),
            Row::Map(map) => map.get(column),
            Row::Tuple(_) => None,
        }
    }

    /// Look up a cell by position.
    pub fn at(&self, index: usize) -> Option<&Value> {
        match self {
            Row::Record(record) => record.values().nth(index),
            Row::Map(map) => map.values().nth(index),
            Row::Tuple(values) => values.get(index),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Row::Record(record) => record.len(),
            Row::Map(map) => map.len(),
            Row::Tuple(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What a single-row retrieval produced: the bare scalar for one-column
/// results, a shaped row otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Scalar(Value),
    Row(Row),
}

impl Fetched {
    pub fn scalar(self) -> Option<Value> {
        match self {
            Fetched::Scalar(value) => Some(value),
            Fetched::Row(_) => None,
        }
    }

    pub fn row(self) -> Option<Row> {
        match self {
            Fetched::Row(row) => Some(row),
            Fetched::Scalar(_) => None,
        }
    }
}

/// What a row-set retrieval produced: scalars for one-column results,
/// shaped rows otherwise. One-column results are never records.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSet {
    Scalars(Vec<Value>),
    Records(Vec<Row>),
}

impl RowSet {
    pub fn len(&self) -> usize {
        match self {
            RowSet::Scalars(values) => values.len(),
            RowSet::Records(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fully materialized result of one statement execution.
///
/// Owned exclusively by the call that created it; nothing is retained
/// past the call. `affected` is meaningful for write statements and 0
/// for row-returning ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub affected: u64,
}

impl ResultSet {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Single-row retrieval. Zero rows is the explicit absent signal,
    /// not an error; one column yields the scalar, more yield a row.
    pub fn read_one(mut self, shape: RowShape) -> Option<Fetched> {
        if self.rows.is_empty() {
            return None;
        }
        let cells = self.rows.swap_remove(0);
        Some(if self.columns.len() == 1 {
            Fetched::Scalar(cells.into_iter().next().unwrap_or(Value::Null))
        } else {
            Fetched::Row(shape_row(&self.columns, cells, shape))
        })
    }

    /// Row-set retrieval. An empty result yields an empty sequence of
    /// whichever kind the column count calls for.
    pub fn read_many(self, shape: RowShape) -> RowSet {
        if self.columns.len() == 1 {
            RowSet::Scalars(
                self.rows
                    .into_iter()
                    .map(|cells| cells.into_iter().next().unwrap_or(Value::Null))
                    .collect(),
            )
        } else {
            RowSet::Records(
                self.rows
                    .into_iter()
                    .map(|cells| shape_row(&self.columns, cells, shape))
                    .collect(),
            )
        }
    }

    /// Key/value retrieval over an exactly-2-column result.
    ///
    /// Pairs come back in row order; a later duplicate key overwrites the
    /// earlier value in place, keeping the original position. Any other
    /// column count fails before a single row is materialized.
    pub fn read_pairs(self) -> Result<Vec<(Value, Value)>> {
        if self.columns.len() != 2 {
            return Err(DbError::ShapeMismatch {
                columns: self.columns.len(),
            });
        }
        let mut pairs: Vec<(Value, Value)> = Vec::with_capacity(self.rows.len());
        for cells in self.rows {
            let mut cells = cells.into_iter();
            let key = cells.next().unwrap_or(Value::Null);
            let value = cells.next().unwrap_or(Value::Null);
            match pairs.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => pairs.push((key, value)),
            }
        }
        Ok(pairs)
    }
}

fn shape_row(columns: &[String], cells: Vec<Value>, shape: RowShape) -> Row {
    match shape {
        RowShape::Record => Row::Record(
            columns
                .iter()
                .cloned()
                .zip(cells)
                .collect(),
        ),
        RowShape::Map => Row::Map(columns.iter().cloned().zip(cells).collect()),
        RowShape::Tuple => Row::Tuple(cells),
    }
}
