//! The CRUD façade.
//!
//! `Db` owns one backend connection for its whole lifetime and composes
//! the statement executor with the result normalizer. Everything here is
//! synchronous and blocking; a `Db` is one exclusively-owned connection,
//! so callers wanting concurrency open one `Db` per thread.
//!
//! # Identifier trust boundary
//!
//! Parameter *values* are always bound, never interpolated. Table and
//! column *identifiers*, and the free-form condition fragment of
//! [`Filter::Clause`], are interpolated verbatim — callers must not pass
//! untrusted identifiers or fragments.

use crate::backend::{self, Backend};
use crate::config::ConnectOptions;
use crate::error::{DbError, Result};
use crate::params::Params;
use crate::record::Record;
use crate::result::{Fetched, ResultSet, RowSet, RowShape};
use crate::value::Value;

/// Default primary-key column for the shorthand CRUD operations.
pub const DEFAULT_KEY: &str = "id";

/// Outcome of [`Db::save`]: which operation ran, and what it returned.
#[derive(Debug, Clone, PartialEq)]
pub enum Saved {
    /// An insert ran; carries the backend-assigned id when available.
    Inserted(Option<i64>),
    /// An update ran; carries the affected-row count.
    Updated(u64),
}

/// Outcome of [`Db::get`]: a single row lookup or a filtered row set,
/// depending on which mode the filter selected.
#[derive(Debug, Clone, PartialEq)]
pub enum Found {
    One(Option<Fetched>),
    Many(RowSet),
}

/// Lookup argument for [`Db::get`], dispatching between an exact
/// primary-key match and a free-form condition fragment.
///
/// The dispatch is type-based, mirroring the shape of the source API it
/// models: strings — including `Value::Text` — always select the
/// raw-clause mode. The documented consequence is that tables with a
/// string-typed primary key cannot use the scalar form; spell the
/// condition out (`Filter::clause_with("code = ?", …)`) instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Exact match on the key column; routed through `read_one`.
    Key(Value),
    /// Raw caller-trusted condition fragment, with optional parameters
    /// bound against placeholders inside it; routed through `read_many`.
    Clause(String, Params),
}

impl Filter {
    pub fn key(value: impl Into<Value>) -> Self {
        Filter::Key(value.into())
    }

    pub fn clause(expr: impl Into<String>) -> Self {
        Filter::Clause(expr.into(), Params::None)
    }

    pub fn clause_with(expr: impl Into<String>, params: impl Into<Params>) -> Self {
        Filter::Clause(expr.into(), params.into())
    }
}

impl From<&str> for Filter {
    fn from(expr: &str) -> Self {
        Filter::clause(expr)
    }
}

impl From<String> for Filter {
    fn from(expr: String) -> Self {
        Filter::clause(expr)
    }
}

impl From<i64> for Filter {
    fn from(key: i64) -> Self {
        Filter::Key(Value::Integer(key))
    }
}

impl From<i32> for Filter {
    fn from(key: i32) -> Self {
        Filter::Key(Value::from(key))
    }
}

impl From<f64> for Filter {
    fn from(key: f64) -> Self {
        Filter::Key(Value::Real(key))
    }
}

impl From<Value> for Filter {
    fn from(value: Value) -> Self {
        match value {
            // Text keeps the source's type-based dispatch: strings are
            // condition fragments, not key values
            Value::Text(expr) => Filter::clause(expr),
            other => Filter::Key(other),
        }
    }
}

/// A database connection with shorthand CRUD operations.
pub struct Db {
    backend: Option<Box<dyn Backend>>,
    shape: RowShape,
}

impl Db {
    /// Open the backend the options' DSN names. The options are read
    /// once, here; mutating external configuration afterwards does not
    /// affect this instance.
    pub fn connect(options: &ConnectOptions) -> Result<Self> {
        let backend = backend::open_backend(options)?;
        Ok(Self {
            backend: Some(backend),
            shape: options.shape(),
        })
    }

    /// Connect with default options for a DSN.
    pub fn open(dsn: &str) -> Result<Self> {
        Self::connect(&ConnectOptions::new(dsn))
    }

    /// Release the connection. Idempotent; after the first call every
    /// executor operation fails with [`DbError::Closed`]. The connection
    /// is also released when the `Db` is dropped.
    pub fn close(&mut self) {
        self.backend = None;
    }

    pub fn is_closed(&self) -> bool {
        self.backend.is_none()
    }

    fn backend_mut(&mut self) -> Result<&mut (dyn Backend + 'static)> {
        self.backend.as_deref_mut().ok_or(DbError::Closed)
    }

    /// Prepare, bind, execute; return the materialized result set.
    pub fn exec(&mut self, sql: &str, params: impl Into<Params>) -> Result<ResultSet> {
        let params = params.into();
        self.backend_mut()?.execute(sql, &params)
    }

    /// Like [`exec`](Self::exec), but returns only the affected-row
    /// count. Used by the write operations, which have no rows to read.
    pub fn exec_count(&mut self, sql: &str, params: impl Into<Params>) -> Result<u64> {
        Ok(self.exec(sql, params)?.affected)
    }

    /// Execute and take the first row: `None` for an empty result, the
    /// bare scalar for one-column results, a shaped row otherwise.
    pub fn read_one(&mut self, sql: &str, params: impl Into<Params>) -> Result<Option<Fetched>> {
        let shape = self.shape;
        Ok(self.exec(sql, params)?.read_one(shape))
    }

    /// Execute and take every row: scalars for one-column results,
    /// shaped rows otherwise.
    pub fn read_many(&mut self, sql: &str, params: impl Into<Params>) -> Result<RowSet> {
        let shape = self.shape;
        Ok(self.exec(sql, params)?.read_many(shape))
    }

    /// Execute a 2-column query and fold it into ordered key/value
    /// pairs. Any other column count is a [`DbError::ShapeMismatch`].
    pub fn read_pairs(&mut self, sql: &str, params: impl Into<Params>) -> Result<Vec<(Value, Value)>> {
        self.exec(sql, params)?.read_pairs()
    }

    /// Insert a record, columns in record order. Returns the
    /// backend-assigned id, or `None` when the backend has no such
    /// notion.
    pub fn insert(&mut self, table: &str, record: &Record) -> Result<Option<i64>> {
        if record.is_empty() {
            return Err(DbError::InvalidRecord {
                message: "cannot insert an empty record".into(),
            });
        }
        let columns: Vec<&str> = record.column_names().collect();
        let placeholders: Vec<&str> = std::iter::repeat_n("?", columns.len()).collect();
        let sql = format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        );
        let values: Vec<Value> = record.values().cloned().collect();
        self.exec_count(&sql, values)?;
        Ok(self.backend_mut()?.last_insert_id())
    }

    /// Update the row whose `id` matches the record's. See
    /// [`update_with_key`](Self::update_with_key).
    pub fn update(&mut self, table: &str, record: &Record) -> Result<u64> {
        self.update_with_key(table, record, DEFAULT_KEY)
    }

    /// Update the row whose key column matches the record's. The record
    /// must contain the key column, or [`DbError::MissingKey`] is raised
    /// before any SQL is built. Every record column — the key included —
    /// lands in the SET list; the key value is bound again for the WHERE
    /// match. Returns the affected-row count.
    pub fn update_with_key(&mut self, table: &str, record: &Record, key: &str) -> Result<u64> {
        let Some(key_value) = record.get(key).cloned() else {
            return Err(DbError::MissingKey {
                column: key.to_string(),
            });
        };
        let assignments: Vec<String> = record
            .column_names()
            .map(|column| format!("{column} = ?"))
            .collect();
        let sql = format!(
            "UPDATE {table} SET {} WHERE {key} = ?",
            assignments.join(", ")
        );
        let mut values: Vec<Value> = record.values().cloned().collect();
        values.push(key_value);
        self.exec_count(&sql, values)
    }

    /// Delete the row whose `id` matches. Returns the affected-row count.
    pub fn delete(&mut self, table: &str, id: impl Into<Value>) -> Result<u64> {
        self.delete_with_key(table, id, DEFAULT_KEY)
    }

    pub fn delete_with_key(&mut self, table: &str, id: impl Into<Value>, key: &str) -> Result<u64> {
        let sql = format!("DELETE FROM {table} WHERE {key} = ?");
        self.exec_count(&sql, id.into())
    }

    /// Insert or update, dispatched purely on whether the record carries
    /// the `id` column — no existence check is made against the table.
    pub fn save(&mut self, table: &str, record: &Record) -> Result<Saved> {
        self.save_with_key(table, record, DEFAULT_KEY)
    }

    pub fn save_with_key(&mut self, table: &str, record: &Record, key: &str) -> Result<Saved> {
        if record.contains(key) {
            Ok(Saved::Updated(self.update_with_key(table, record, key)?))
        } else {
            Ok(Saved::Inserted(self.insert(table, record)?))
        }
    }

    /// Dual-mode lookup: a scalar filter is an exact `id` match routed
    /// through `read_one`; a string filter is a raw condition fragment
    /// routed through `read_many`. See [`Filter`] for the dispatch rules
    /// and their documented wart.
    pub fn get(&mut self, table: &str, filter: impl Into<Filter>) -> Result<Found> {
        self.get_with_key(table, filter, DEFAULT_KEY)
    }

    pub fn get_with_key(
        &mut self,
        table: &str,
        filter: impl Into<Filter>,
        key: &str,
    ) -> Result<Found> {
        match filter.into() {
            Filter::Clause(expr, params) => {
                let sql = format!("SELECT * FROM {table} WHERE {expr}");
                Ok(Found::Many(self.read_many(&sql, params)?))
            }
            Filter::Key(value) => {
                let sql = format!("SELECT * FROM {table} WHERE {key} = ?");
                Ok(Found::One(self.read_one(&sql, value)?))
            }
        }
    }
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field(
                "backend",
                &self.backend.as_ref().map(|b| b.name()).unwrap_or("closed"),
            )
            .field("shape", &self.shape)
            .finish()
    }
}
