//! SQLite backend over `rusqlite`.
//!
//! The default engine. `:memory:` opens an in-memory database, which is
//! what the test suites use to avoid disk I/O and temp file management.

use rusqlite::Connection;
use rusqlite::types::{ToSqlOutput, Value as SqlValue, ValueRef as SqlValueRef};

use super::Backend;
use crate::error::{DbError, Result};
use crate::params::Params;
use crate::result::ResultSet;
use crate::value::Value;

#[derive(Debug)]
pub(crate) struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    pub(crate) fn open(path: &str) -> Result<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(path)
        };
        let conn = conn.map_err(|e| DbError::Connection {
            dsn: path.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { conn })
    }
}

impl Backend for SqliteBackend {
    fn execute(&mut self, sql: &str, params: &Params) -> Result<ResultSet> {
        let mut stmt = self.conn.prepare(sql).map_err(execution)?;
        bind(&mut stmt, params)?;

        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(|c| c.to_string())
            .collect();

        // Zero result columns means a non-SELECT statement
        if columns.is_empty() {
            let affected = stmt.raw_execute().map_err(execution)? as u64;
            return Ok(ResultSet {
                columns,
                rows: vec![],
                affected,
            });
        }

        let width = columns.len();
        let mut rows = Vec::new();
        let mut raw = stmt.raw_query();
        while let Some(row) = raw.next().map_err(execution)? {
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                cells.push(cell_value(row.get_ref(i).map_err(execution)?));
            }
            rows.push(cells);
        }
        Ok(ResultSet {
            columns,
            rows,
            affected: 0,
        })
    }

    fn last_insert_id(&self) -> Option<i64> {
        Some(self.conn.last_insert_rowid())
    }

    fn name(&self) -> &'static str {
        "Sqlite"
    }
}

fn bind(stmt: &mut rusqlite::Statement<'_>, params: &Params) -> Result<()> {
    let declared = stmt.parameter_count();
    match params {
        Params::None => {
            if declared != 0 {
                return Err(DbError::Execution {
                    message: format!("statement declares {declared} parameters, none given"),
                });
            }
        }
        Params::Positional(values) => {
            if values.len() != declared {
                return Err(DbError::Execution {
                    message: format!(
                        "statement declares {declared} parameters, got {}",
                        values.len()
                    ),
                });
            }
            for (i, value) in values.iter().enumerate() {
                stmt.raw_bind_parameter(i + 1, value).map_err(execution)?;
            }
        }
        Params::Named(pairs) => {
            if pairs.len() != declared {
                return Err(DbError::Execution {
                    message: format!(
                        "statement declares {declared} parameters, got {}",
                        pairs.len()
                    ),
                });
            }
            for (name, value) in pairs {
                let key = if name.starts_with(':') {
                    name.clone()
                } else {
                    format!(":{name}")
                };
                let index = stmt
                    .parameter_index(&key)
                    .map_err(execution)?
                    .ok_or_else(|| DbError::Execution {
                        message: format!("statement has no parameter named '{name}'"),
                    })?;
                stmt.raw_bind_parameter(index, value).map_err(execution)?;
            }
        }
    }
    Ok(())
}

fn cell_value(cell: SqlValueRef<'_>) -> Value {
    match cell {
        SqlValueRef::Null => Value::Null,
        SqlValueRef::Integer(i) => Value::Integer(i),
        SqlValueRef::Real(f) => Value::Real(f),
        SqlValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        SqlValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}

fn execution(e: rusqlite::Error) -> DbError {
    DbError::Execution {
        message: e.to_string(),
    }
}

impl rusqlite::ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Integer(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Value::Real(f) => ToSqlOutput::Owned(SqlValue::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(SqlValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(SqlValueRef::Blob(b)),
            // SQLite has no boolean storage class
            Value::Bool(b) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b))),
        })
    }
}
