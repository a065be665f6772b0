//! Database connections.

use std::path::Path;

use rusqlite::types::{Value as SqlValue, ValueRef};
use tracing::debug;

use crate::error::Result;
use crate::value::Value;

/// A database connection the query layer executes against.
pub trait Connection {
    /// Quote an identifier.
    fn quote_name(&self, name: &str) -> String {
        if name.starts_with('"') && name.ends_with('"') {
            return name.to_string();
        }
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Execute a statement, returning the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<usize>;

    /// Run a query, returning every row.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Vec<Value>>>;

    /// Row id of the most recent insert.
    fn last_insert_id(&self) -> i64;
}

/// SQLite connection.
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory()?;
        Self::init(conn)
    }

    /// Open a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = rusqlite::Connection::open(path)?;
        Self::init(conn)
    }

    fn init(conn: rusqlite::Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Execute several statements separated by semicolons.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        debug!(sql, "executing batch");
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Column names of a table, in declaration order.
    pub fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        let sql = format!("PRAGMA table_info({})", self.quote_name(table));
        let mut stmt = self.conn.prepare(&sql)?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
    }
}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl Connection for SqliteConnection {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        debug!(sql, params = params.len(), "executing statement");
        let affected = self
            .conn
            .execute(sql, rusqlite::params_from_iter(params.iter().map(to_sqlite)))?;
        Ok(affected)
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Vec<Value>>> {
        debug!(sql, params = params.len(), "running query");
        let mut stmt = self.conn.prepare(sql)?;
        let width = stmt.column_count();
        let rows = stmt
            .query_map(
                rusqlite::params_from_iter(params.iter().map(to_sqlite)),
                |row| {
                    (0..width)
                        .map(|i| row.get_ref(i).map(from_sqlite))
                        .collect::<rusqlite::Result<Vec<_>>>()
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn last_insert_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }
}

fn to_sqlite(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(*b as i64),
        Value::Int64(i) => SqlValue::Integer(*i),
        Value::Float64(f) => SqlValue::Real(*f),
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Bytes(b) => SqlValue::Blob(b.clone()),
    }
}

fn from_sqlite(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int64(i),
        ValueRef::Real(f) => Value::Float64(f),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_name() {
        let conn = SqliteConnection::open_in_memory().unwrap();
        assert_eq!(conn.quote_name("name"), "\"name\"");
        assert_eq!(conn.quote_name("\"name\""), "\"name\"");
        assert_eq!(conn.quote_name("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_execute_and_query() {
        let conn = SqliteConnection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (a integer, b text, c blob)")
            .unwrap();

        let inserted = conn
            .execute(
                "INSERT INTO t (a, b, c) VALUES (?, ?, ?)",
                &[Value::Bool(true), Value::from("x"), Value::Null],
            )
            .unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(conn.last_insert_id(), 1);

        let rows = conn.query("SELECT a, b, c FROM t", &[]).unwrap();
        assert_eq!(
            rows,
            vec![vec![Value::Int64(1), Value::String("x".into()), Value::Null]]
        );
    }

    #[test]
    fn test_table_columns() {
        let conn = SqliteConnection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id integer, name text)")
            .unwrap();
        assert_eq!(conn.table_columns("t").unwrap(), vec!["id", "name"]);
    }
}
