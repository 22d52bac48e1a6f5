//! PostgreSQL backend over the synchronous `postgres` client.
//!
//! The API surface uses `?` and `:name` placeholders; PostgreSQL only
//! understands `$n`, so statements are rewritten before preparation. The
//! rewrite is quote-aware and leaves `::type` casts untouched.
//!
//! PostgreSQL has no engine-wide "last insert id", so `last_insert_id`
//! is `None` here — callers needing the id of an inserted row should use
//! a `RETURNING` clause through the plain executor.

use bytes::BytesMut;
use postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use postgres::{Client, NoTls};

use super::Backend;
use crate::error::{DbError, Result};
use crate::params::Params;
use crate::result::ResultSet;
use crate::value::Value;

pub(crate) struct PostgresBackend {
    client: Client,
}

impl PostgresBackend {
    /// Connect with a URL or libpq key-value connection string.
    /// Explicit credentials override any carried by the DSN.
    pub(crate) fn connect(dsn: &str, username: Option<&str>, password: Option<&str>) -> Result<Self> {
        let connection = |message: String| DbError::Connection {
            dsn: dsn.to_string(),
            message,
        };
        let mut config: postgres::Config = dsn.parse().map_err(|e: postgres::Error| connection(e.to_string()))?;
        if let Some(user) = username {
            config.user(user);
        }
        if let Some(pass) = password {
            config.password(pass);
        }
        let client = config
            .connect(NoTls)
            .map_err(|e| connection(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Backend for PostgresBackend {
    fn execute(&mut self, sql: &str, params: &Params) -> Result<ResultSet> {
        let (sql, bound) = rewrite_placeholders(sql, params)?;
        let stmt = self.client.prepare(&sql).map_err(execution)?;
        let columns: Vec<String> = stmt.columns().iter().map(|c| c.name().to_string()).collect();

        let args: Vec<&(dyn ToSql + Sync)> =
            bound.iter().map(|v| v as &(dyn ToSql + Sync)).collect();

        if columns.is_empty() {
            let affected = self.client.execute(&stmt, &args).map_err(execution)?;
            return Ok(ResultSet {
                columns,
                rows: vec![],
                affected,
            });
        }

        let pg_rows = self.client.query(&stmt, &args).map_err(execution)?;
        let mut rows = Vec::with_capacity(pg_rows.len());
        for pg_row in &pg_rows {
            let mut cells = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                cells.push(cell_value(pg_row, i)?);
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
        None
    }

    fn name(&self) -> &'static str {
        "Postgres"
    }
}

/// Rewrite `?` and `:name` placeholders to `$n`, collecting the values
/// to bind in placeholder order. Repeated named placeholders share one
/// `$n` slot.
fn rewrite_placeholders(sql: &str, params: &Params) -> Result<(String, Vec<Value>)> {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut bound: Vec<Value> = Vec::new();
    let mut named_slots: Vec<(String, usize)> = Vec::new();
    let mut next_positional = 0usize;
    let mut in_single = false;
    let mut in_double = false;

    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' if !in_double => {
                in_single = !in_single;
                out.push(c);
            }
            '"' if !in_single => {
                in_double = !in_double;
                out.push(c);
            }
            '?' if !in_single && !in_double => {
                let Params::Positional(values) = params else {
                    return Err(DbError::Execution {
                        message: "positional placeholder without positional parameters".into(),
                    });
                };
                let value = values.get(next_positional).ok_or_else(|| DbError::Execution {
                    message: format!(
                        "statement declares more than {} positional parameters",
                        values.len()
                    ),
                })?;
                next_positional += 1;
                bound.push(value.clone());
                out.push_str(&format!("${}", bound.len()));
            }
            ':' if !in_single && !in_double => {
                // '::' is a cast, not a placeholder
                if chars.peek() == Some(&':') {
                    chars.next();
                    out.push_str("::");
                    continue;
                }
                let mut name = String::new();
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        name.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if name.is_empty() {
                    out.push(':');
                    continue;
                }
                let Params::Named(pairs) = params else {
                    return Err(DbError::Execution {
                        message: format!("named placeholder ':{name}' without named parameters"),
                    });
                };
                let slot = named_slots.iter().find(|(n, _)| *n == name).map(|(_, i)| *i);
                let slot = match slot {
                    Some(index) => index,
                    None => {
                        let (_, value) = pairs
                            .iter()
                            .find(|(n, _)| n.trim_start_matches(':') == name)
                            .ok_or_else(|| DbError::Execution {
                                message: format!("no value for parameter ':{name}'"),
                            })?;
                        bound.push(value.clone());
                        named_slots.push((name.clone(), bound.len()));
                        bound.len()
                    }
                };
                out.push_str(&format!("${slot}"));
            }
            _ => out.push(c),
        }
    }

    if let Params::Positional(values) = params {
        if next_positional != values.len() {
            return Err(DbError::Execution {
                message: format!(
                    "statement declares {next_positional} parameters, got {}",
                    values.len()
                ),
            });
        }
    }
    if let Params::Named(pairs) = params {
        if named_slots.len() != pairs.len() {
            return Err(DbError::Execution {
                message: format!(
                    "statement declares {} named parameters, got {}",
                    named_slots.len(),
                    pairs.len()
                ),
            });
        }
    }
    Ok((out, bound))
}

fn cell_value(row: &postgres::Row, index: usize) -> Result<Value> {
    let ty = row.columns()[index].type_().clone();
    let cell = if ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(index).map(|o| o.map(Value::Bool))
    } else if ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(index)
            .map(|o| o.map(|i| Value::Integer(i64::from(i))))
    } else if ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(index)
            .map(|o| o.map(|i| Value::Integer(i64::from(i))))
    } else if ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(index).map(|o| o.map(Value::Integer))
    } else if ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(index)
            .map(|o| o.map(|f| Value::Real(f64::from(f))))
    } else if ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(index).map(|o| o.map(Value::Real))
    } else if ty == Type::BYTEA {
        row.try_get::<_, Option<Vec<u8>>>(index).map(|o| o.map(Value::Blob))
    } else if ty == Type::TEXT || ty == Type::VARCHAR || ty == Type::BPCHAR || ty == Type::NAME {
        row.try_get::<_, Option<String>>(index).map(|o| o.map(Value::Text))
    } else {
        return Err(DbError::Execution {
            message: format!("unsupported column type '{ty}' in column {index}"),
        });
    };
    Ok(cell.map_err(execution)?.unwrap_or(Value::Null))
}

fn execution(e: postgres::Error) -> DbError {
    DbError::Execution {
        message: e.to_string(),
    }
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> std::result::Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Integer(i) => {
                if *ty == Type::INT2 {
                    (*i as i16).to_sql(ty, out)
                } else if *ty == Type::INT4 {
                    (*i as i32).to_sql(ty, out)
                } else {
                    i.to_sql(ty, out)
                }
            }
            Value::Real(f) => {
                if *ty == Type::FLOAT4 {
                    (*f as f32).to_sql(ty, out)
                } else {
                    f.to_sql(ty, out)
                }
            }
            Value::Text(s) => s.to_sql(ty, out),
            Value::Blob(b) => b.to_sql(ty, out),
            Value::Bool(b) => b.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // Type agreement is the statement's concern; NULL fits anything
        true
    }

    to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positional(values: Vec<Value>) -> Params {
        Params::Positional(values)
    }

    #[test]
    fn test_rewrite_positional() {
        let (sql, bound) = rewrite_placeholders(
            "SELECT * FROM t WHERE a = ? AND b = ?",
            &positional(vec![Value::Integer(1), Value::Integer(2)]),
        )
        .unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE a = $1 AND b = $2");
        assert_eq!(bound, vec![Value::Integer(1), Value::Integer(2)]);
    }

    #[test]
    fn test_rewrite_skips_quoted_question_marks() {
        let (sql, bound) = rewrite_placeholders(
            "SELECT '?' AS lit, \"odd?col\" FROM t WHERE a = ?",
            &positional(vec![Value::Integer(1)]),
        )
        .unwrap();
        assert_eq!(sql, "SELECT '?' AS lit, \"odd?col\" FROM t WHERE a = $1");
        assert_eq!(bound.len(), 1);
    }

    #[test]
    fn test_rewrite_named_with_repeats() {
        let params = Params::Named(vec![
            ("lo".to_string(), Value::Integer(1)),
            ("hi".to_string(), Value::Integer(9)),
        ]);
        let (sql, bound) = rewrite_placeholders(
            "SELECT * FROM t WHERE a BETWEEN :lo AND :hi OR b = :lo",
            &params,
        )
        .unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE a BETWEEN $1 AND $2 OR b = $1");
        assert_eq!(bound, vec![Value::Integer(1), Value::Integer(9)]);
    }

    #[test]
    fn test_rewrite_leaves_casts_alone() {
        let (sql, bound) =
            rewrite_placeholders("SELECT a::text FROM t", &Params::None).unwrap();
        assert_eq!(sql, "SELECT a::text FROM t");
        assert!(bound.is_empty());
    }

    #[test]
    fn test_rewrite_too_few_positional_fails() {
        let err = rewrite_placeholders(
            "SELECT * FROM t WHERE a = ? AND b = ?",
            &positional(vec![Value::Integer(1)]),
        )
        .unwrap_err();
        assert!(matches!(err, DbError::Execution { .. }));
    }

    #[test]
    fn test_rewrite_too_many_positional_fails() {
        let err = rewrite_placeholders(
            "SELECT * FROM t WHERE a = ?",
            &positional(vec![Value::Integer(1), Value::Integer(2)]),
        )
        .unwrap_err();
        assert!(matches!(err, DbError::Execution { .. }));
    }

    #[test]
    fn test_rewrite_unknown_named_fails() {
        let err = rewrite_placeholders(
            "SELECT * FROM t WHERE a = :a",
            &Params::Named(vec![("b".to_string(), Value::Integer(1))]),
        )
        .unwrap_err();
        assert!(matches!(err, DbError::Execution { .. }));
    }
}
