//! Integration tests against a live PostgreSQL instance.
//!
//! Run with: cargo test --features postgres-tests
//!
//! Prerequisites:
//! 1. A local PostgreSQL server accepting the connection string below
//! 2. Create test database: `createdb -U postgres quickdb_test`

#![cfg(feature = "postgres-tests")]

use std::error::Error;

use quickdb::{Db, DbError, Fetched, Found, RowSet, Saved, Value, record};

/// Test connection string for PostgreSQL (local instance)
const PG_CONNECTION: &str = "host=localhost user=postgres dbname=quickdb_test";

/// Connect and (re)create the shared test table.
fn fresh_db() -> Result<Db, Box<dyn Error>> {
    let mut db = Db::open(PG_CONNECTION)?;
    db.exec("DROP TABLE IF EXISTS quickdb_users", ())?;
    db.exec(
        "CREATE TABLE quickdb_users (id BIGINT PRIMARY KEY, name TEXT, score DOUBLE PRECISION)",
        (),
    )?;
    Ok(db)
}

fn seed(db: &mut Db) -> Result<(), Box<dyn Error>> {
    for (id, name, score) in [(1i64, "bob", 1.5), (2, "agatha", 2.5), (3, "coyote", 3.5)] {
        db.insert(
            "quickdb_users",
            &record! { "id" => id, "name" => name, "score" => score },
        )?;
    }
    Ok(())
}

// ============================================================================
// Tests - Connectivity
// ============================================================================

#[test]
fn test_connects_and_reports_backend() -> Result<(), Box<dyn Error>> {
    let db = fresh_db()?;
    assert!(format!("{db:?}").contains("Postgres"));
    Ok(())
}

#[test]
fn test_bad_credentials_fail_at_connect() {
    let result = Db::open("host=localhost user=quickdb_no_such_user dbname=quickdb_test");
    assert!(matches!(result, Err(DbError::Connection { .. })));
}

// ============================================================================
// Tests - Executor and Placeholder Rewrite
// ============================================================================

#[test]
fn test_positional_placeholders_round_trip() -> Result<(), Box<dyn Error>> {
    let mut db = fresh_db()?;
    seed(&mut db)?;

    let fetched = db
        .read_one("SELECT name FROM quickdb_users WHERE id = ?", 2i64)?
        .and_then(Fetched::scalar);
    assert_eq!(fetched, Some(Value::Text("agatha".into())));
    Ok(())
}

#[test]
fn test_named_placeholders_round_trip() -> Result<(), Box<dyn Error>> {
    let mut db = fresh_db()?;
    seed(&mut db)?;

    let params = vec![("lo", Value::Integer(2)), ("hi", Value::Integer(3))];
    let set = db.read_many(
        "SELECT name FROM quickdb_users WHERE id BETWEEN :lo AND :hi ORDER BY id",
        params,
    )?;
    assert_eq!(
        set,
        RowSet::Scalars(vec![
            Value::Text("agatha".into()),
            Value::Text("coyote".into()),
        ])
    );
    Ok(())
}

#[test]
fn test_casts_survive_the_rewrite() -> Result<(), Box<dyn Error>> {
    let mut db = fresh_db()?;
    seed(&mut db)?;

    let fetched = db
        .read_one("SELECT id::text FROM quickdb_users WHERE id = ?", 1i64)?
        .and_then(Fetched::scalar);
    assert_eq!(fetched, Some(Value::Text("1".into())));
    Ok(())
}

// ============================================================================
// Tests - Result Shaping
// ============================================================================

#[test]
fn test_read_pairs() -> Result<(), Box<dyn Error>> {
    let mut db = fresh_db()?;
    seed(&mut db)?;

    let pairs = db.read_pairs("SELECT id, name FROM quickdb_users ORDER BY id", ())?;
    assert_eq!(
        pairs,
        vec![
            (Value::Integer(1), Value::Text("bob".into())),
            (Value::Integer(2), Value::Text("agatha".into())),
            (Value::Integer(3), Value::Text("coyote".into())),
        ]
    );
    Ok(())
}

#[test]
fn test_float_and_null_cells() -> Result<(), Box<dyn Error>> {
    let mut db = fresh_db()?;
    db.insert("quickdb_users", &record! { "id" => 1i64, "score" => 1.5 })?;

    let Found::One(Some(fetched)) = db.get("quickdb_users", 1i64)? else {
        panic!("expected a row");
    };
    let row = fetched.row().unwrap();
    assert_eq!(row.get("score"), Some(&Value::Real(1.5)));
    assert_eq!(row.get("name"), Some(&Value::Null));
    Ok(())
}

// ============================================================================
// Tests - CRUD Facade
// ============================================================================

#[test]
fn test_insert_reports_no_generated_id() -> Result<(), Box<dyn Error>> {
    let mut db = fresh_db()?;
    let id = db.insert("quickdb_users", &record! { "id" => 1i64, "name" => "bob" })?;
    // No engine-wide last-insert id on this backend
    assert_eq!(id, None);
    Ok(())
}

#[test]
fn test_update_and_delete_report_affected_rows() -> Result<(), Box<dyn Error>> {
    let mut db = fresh_db()?;
    seed(&mut db)?;

    let affected = db.update("quickdb_users", &record! { "name" => "x", "id" => 2i64 })?;
    assert_eq!(affected, 1);

    assert_eq!(db.delete("quickdb_users", 2i64)?, 1);
    assert_eq!(db.delete("quickdb_users", 2i64)?, 0);
    Ok(())
}

#[test]
fn test_save_dispatches_on_key_presence() -> Result<(), Box<dyn Error>> {
    let mut db = fresh_db()?;
    seed(&mut db)?;

    let saved = db.save("quickdb_users", &record! { "name" => "hazel", "id" => 2i64 })?;
    assert_eq!(saved, Saved::Updated(1));

    let saved = db.save(
        "quickdb_users",
        &record! { "id" => 4i64, "name" => "georgia" },
    )?;
    assert_eq!(saved, Saved::Updated(0));
    Ok(())
}

#[test]
fn test_get_with_clause() -> Result<(), Box<dyn Error>> {
    let mut db = fresh_db()?;
    seed(&mut db)?;

    let Found::Many(RowSet::Records(rows)) =
        db.get("quickdb_users", "id > 1 ORDER BY id")?
    else {
        panic!("expected a row set");
    };
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("name"), Some(&Value::Text("agatha".into())));
    Ok(())
}

// ============================================================================
// Tests - Error Handling
// ============================================================================

#[test]
fn test_invalid_sql_is_an_execution_error() -> Result<(), Box<dyn Error>> {
    let mut db = fresh_db()?;
    let result = db.exec("SELEKT 1", ());
    assert!(matches!(result, Err(DbError::Execution { .. })));
    Ok(())
}
