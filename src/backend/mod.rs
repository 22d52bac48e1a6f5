//! Backend abstraction layer.
//!
//! A backend owns one live connection and knows how to prepare a
//! statement, bind a parameter collection, execute, and hand back a
//! materialized [`ResultSet`]. Backends are selected at runtime from the
//! DSN; each one lives behind its own cargo feature so unused engines
//! stay out of the build.

use crate::config::{BackendKind, ConnectOptions};
use crate::error::{DbError, Result};
use crate::params::Params;
use crate::result::ResultSet;

#[cfg(feature = "backend-sqlite")]
pub(crate) mod sqlite;

#[cfg(feature = "backend-postgres")]
pub(crate) mod postgres;

/// One exclusively-owned database connection.
///
/// Implementations are fail-fast: every engine error becomes a typed
/// [`DbError`], never a sentinel return.
pub trait Backend {
    /// Prepare `sql`, bind `params`, execute, and materialize the result.
    fn execute(&mut self, sql: &str, params: &Params) -> Result<ResultSet>;

    /// The row id the engine assigned to the most recent insert, if the
    /// engine has that notion.
    fn last_insert_id(&self) -> Option<i64>;

    /// Backend name for error messages and debugging.
    fn name(&self) -> &'static str;
}

/// Open the backend the options' DSN names.
pub(crate) fn open_backend(options: &ConnectOptions) -> Result<Box<dyn Backend>> {
    match options.backend_kind()? {
        BackendKind::Sqlite { path } => open_sqlite(&path),
        BackendKind::Postgres { dsn } => open_postgres(&dsn, options),
    }
}

#[cfg(feature = "backend-sqlite")]
fn open_sqlite(path: &str) -> Result<Box<dyn Backend>> {
    Ok(Box::new(sqlite::SqliteBackend::open(path)?))
}

#[cfg(not(feature = "backend-sqlite"))]
fn open_sqlite(path: &str) -> Result<Box<dyn Backend>> {
    Err(DbError::UnsupportedDsn { dsn: path.into() })
}

#[cfg(feature = "backend-postgres")]
fn open_postgres(dsn: &str, options: &ConnectOptions) -> Result<Box<dyn Backend>> {
    Ok(Box::new(postgres::PostgresBackend::connect(
        dsn,
        options.username_ref(),
        options.password_ref(),
    )?))
}

#[cfg(not(feature = "backend-postgres"))]
fn open_postgres(dsn: &str, _options: &ConnectOptions) -> Result<Box<dyn Backend>> {
    Err(DbError::UnsupportedDsn { dsn: dsn.into() })
}
