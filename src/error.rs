//! Error types for the database layer.

use thiserror::Error;

/// Database error types.
///
/// Every backend failure surfaces as one of these variants; nothing is
/// mapped to a silent sentinel value. An absent row is *not* an error —
/// `read_one` signals it with `Ok(None)`.
#[derive(Error, Debug)]
pub enum DbError {
    /// Backend unreachable or bad credentials. Fatal to construction.
    #[error("Failed to connect to '{dsn}': {message}")]
    Connection { dsn: String, message: String },

    /// Malformed SQL, constraint violation, or a backend type mismatch.
    /// Propagated verbatim from the backend.
    #[error("Query failed: {message}")]
    Execution { message: String },

    /// `read_pairs` was invoked against a result whose column count is
    /// not exactly 2. Raised before any row materialization.
    #[error("Expected a 2-column result for pairs, got {columns}")]
    ShapeMismatch { columns: usize },

    /// `update` (or `save` routed to update) was given a record lacking
    /// the key column. Raised before any SQL is built.
    #[error("Record is missing key column '{column}'")]
    MissingKey { column: String },

    /// A record adapter was given a value it cannot normalize into an
    /// ordered column mapping (e.g. a JSON array, or a nested object).
    #[error("Cannot build record: {message}")]
    InvalidRecord { message: String },

    /// Any executor call after `close()`. Closed is a terminal state.
    #[error("Connection is closed")]
    Closed,

    /// The DSN names a backend this build does not know or was compiled
    /// without.
    #[error("Unsupported DSN '{dsn}'")]
    UnsupportedDsn { dsn: String },
}

pub type Result<T> = std::result::Result<T, DbError>;
