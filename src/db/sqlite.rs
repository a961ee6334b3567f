//! SQLite driver backed by `rusqlite`.
//!
//! Accepted URLs: `sqlite:<relative path>`, `sqlite:///<absolute path>` and
//! `sqlite::memory:`. Databases are opened read-only, so a missing file is a
//! connection failure instead of a freshly created empty database.

use super::{Connection, Cursor, Driver, Record, Statement};
use crate::config::ConnectConfig;
use crate::error::{BoxError, DriverResult};
use percent_encoding::percent_decode_str;
use rusqlite::types::ValueRef;
use rusqlite::{OpenFlags, Row, Rows};
use tracing::debug;
use url::Url;

const MEMORY: &str = ":memory:";

pub struct SqliteDriver;

impl Driver for SqliteDriver {
    fn scheme(&self) -> &'static str {
        "sqlite"
    }

    fn connect(&self, config: &ConnectConfig) -> DriverResult<Box<dyn Connection>> {
        let path = database_path(config.url())?;
        debug!(path = %path, "opening sqlite database");

        let conn = if path == MEMORY {
            rusqlite::Connection::open_in_memory()?
        } else {
            rusqlite::Connection::open_with_flags(
                &path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?
        };

        Ok(Box::new(SqliteConnection { conn }))
    }
}

/// File path named by the URL, with percent-escapes (`%20`) decoded
fn database_path(url: &Url) -> DriverResult<String> {
    if let Some(host) = url.host_str().filter(|h| !h.is_empty()) {
        return Err(format!("sqlite URLs name a file, not a host (got `{host}`)").into());
    }
    match url.path() {
        "" | "/" => Err("sqlite URL does not name a database file".into()),
        path => Ok(percent_decode_str(path).decode_utf8()?.into_owned()),
    }
}

struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl Connection for SqliteConnection {
    fn prepare(&mut self, sql: &str) -> DriverResult<Box<dyn Statement + '_>> {
        let stmt = self.conn.prepare(sql)?;
        Ok(Box::new(SqliteStatement { stmt }))
    }

    fn close(self: Box<Self>) -> DriverResult<()> {
        self.conn.close().map_err(|(_conn, e)| BoxError::from(e))
    }
}

struct SqliteStatement<'c> {
    stmt: rusqlite::Statement<'c>,
}

impl Statement for SqliteStatement<'_> {
    fn query(&mut self) -> DriverResult<Box<dyn Cursor + '_>> {
        let rows = self.stmt.query([])?;
        Ok(Box::new(SqliteCursor { rows }))
    }

    fn close(self: Box<Self>) -> DriverResult<()> {
        self.stmt.finalize().map_err(BoxError::from)
    }
}

struct SqliteCursor<'s> {
    rows: Rows<'s>,
}

impl Cursor for SqliteCursor<'_> {
    fn advance(&mut self) -> DriverResult<Option<&dyn Record>> {
        let row = self.rows.next()?;
        Ok(row.map(|r| r as &dyn Record))
    }

    fn close(self: Box<Self>) -> DriverResult<()> {
        // Dropping `Rows` resets the underlying statement.
        drop(self);
        Ok(())
    }
}

impl Record for Row<'_> {
    fn text(&self, column: &str) -> DriverResult<Option<String>> {
        let value = match self.get_ref(column)? {
            ValueRef::Null => None,
            ValueRef::Integer(i) => Some(i.to_string()),
            ValueRef::Real(f) => Some(f.to_string()),
            ValueRef::Text(t) => Some(std::str::from_utf8(t)?.to_string()),
            ValueRef::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_for(url: &str) -> ConnectConfig {
        ConnectConfig::new(url, None, None).unwrap()
    }

    fn seeded_db(temp: &TempDir) -> String {
        let path = temp.path().join("school.db");
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE tasks (title TEXT, subject TEXT, deadline TEXT, points INTEGER, weight REAL);
             INSERT INTO tasks VALUES ('Essay', 'History', '2024-01-01', 10, 0.5);
             INSERT INTO tasks VALUES ('Quiz', NULL, NULL, NULL, NULL);",
        )
        .unwrap();
        format!("sqlite://{}", path.display())
    }

    #[test]
    fn test_reads_values_as_text() {
        let temp = TempDir::new().unwrap();
        let url = seeded_db(&temp);
        let mut conn = SqliteDriver.connect(&config_for(&url)).unwrap();

        {
            let mut stmt = conn
                .prepare("SELECT title, subject, deadline, points, weight FROM tasks ORDER BY rowid")
                .unwrap();
            {
                let mut cursor = stmt.query().unwrap();

                let row = cursor.advance().unwrap().unwrap();
                assert_eq!(row.text("title").unwrap().as_deref(), Some("Essay"));
                assert_eq!(row.text("deadline").unwrap().as_deref(), Some("2024-01-01"));
                assert_eq!(row.text("points").unwrap().as_deref(), Some("10"));
                assert_eq!(row.text("weight").unwrap().as_deref(), Some("0.5"));

                let row = cursor.advance().unwrap().unwrap();
                assert_eq!(row.text("subject").unwrap(), None);
                assert!(row.text("missing").is_err());

                assert!(cursor.advance().unwrap().is_none());
                cursor.close().unwrap();
            }
            stmt.close().unwrap();
        }
        conn.close().unwrap();
    }

    #[test]
    fn test_missing_file_fails_to_connect() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.db");
        let url = format!("sqlite://{}", path.display());

        assert!(SqliteDriver.connect(&config_for(&url)).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_table_fails_to_prepare() {
        let mut conn = SqliteDriver.connect(&config_for("sqlite::memory:")).unwrap();
        let err = conn.prepare("SELECT * FROM tasks").err().unwrap();
        assert!(err.to_string().contains("no such table"));
    }

    #[test]
    fn test_path_with_space_and_non_ascii() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("my school").join("Aufgaben ü");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tasks.db");
        rusqlite::Connection::open(&path)
            .unwrap()
            .execute("CREATE TABLE tasks (title TEXT, subject TEXT, deadline TEXT)", [])
            .unwrap();

        let config = config_for(&format!("sqlite://{}", path.display()));
        assert!(config.url().path().contains("my%20school"));

        let mut conn = SqliteDriver.connect(&config).unwrap();
        let stmt = conn.prepare("SELECT * FROM tasks").unwrap();
        stmt.close().unwrap();
        conn.close().unwrap();
    }

    #[test]
    fn test_database_path() {
        let url = Url::parse("sqlite:school.db").unwrap();
        assert_eq!(database_path(&url).unwrap(), "school.db");

        let url = Url::parse("sqlite:///srv/my%20school/tasks.db").unwrap();
        assert_eq!(database_path(&url).unwrap(), "/srv/my school/tasks.db");

        let url = Url::parse("sqlite://dbhost/school.db").unwrap();
        assert!(database_path(&url).is_err());

        let url = Url::parse("sqlite:///").unwrap();
        assert!(database_path(&url).is_err());
    }
}
