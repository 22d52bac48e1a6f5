//! quickdb — shorthand CRUD and result shaping over a relational backend.
//!
//! A convenience layer for the common query shapes: single value, single
//! row, row set, and key/value pairs, plus an `insert`/`update`/`delete`/
//! `save`/`get` façade that builds parameterized SQL from a loosely-typed
//! [`Record`]. No ORM mapping layer, no query builder — just less
//! boilerplate around a plain connection.
//!
//! # Architecture
//!
//! - [`ConnectOptions`] resolves a DSN template (with an optional `@`
//!   placeholder for the database name) and picks a backend: SQLite via
//!   `rusqlite` (default feature) or PostgreSQL via `postgres` (the
//!   `backend-postgres` feature).
//! - [`Db`] owns the connection, prepares and binds every statement, and
//!   hands results to the normalizer on [`ResultSet`].
//! - The caller-visible shape of a result is decided from the executed
//!   statement's column count, never from caller hints: one column means
//!   scalars, more mean rows materialized per the configured [`RowShape`].
//!
//! # Example
//!
//! ```no_run
//! use quickdb::{Db, record, Saved};
//!
//! # fn main() -> quickdb::Result<()> {
//! let mut db = Db::open("sqlite:app.db")?;
//! let id = db.insert("users", &record! { "name" => "georgia" })?;
//! let saved = db.save("users", &record! { "name" => "hazel", "id" => 2i64 })?;
//! assert_eq!(saved, Saved::Updated(1));
//! db.close();
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod facade;
pub mod params;
pub mod record;
pub mod result;
pub mod value;

pub use backend::Backend;
pub use config::{ConnectOptions, DSN_PLACEHOLDER};
pub use error::{DbError, Result};
pub use facade::{Db, Filter, Found, Saved, DEFAULT_KEY};
pub use params::Params;
pub use record::Record;
pub use result::{Fetched, ResultSet, Row, RowSet, RowShape};
pub use value::Value;
