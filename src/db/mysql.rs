//! MySQL driver backed by the `mysql` crate (feature `mysql`).
//!
//! URL form: `mysql://host[:port]/database`. Credentials come from
//! [`ConnectConfig`], never from the URL itself.

use super::{Connection, Cursor, Driver, Record, Statement};
use crate::config::ConnectConfig;
use crate::error::DriverResult;
use mysql::prelude::Queryable;
use mysql::{Binary, Conn, OptsBuilder, QueryResult, Row, Value};
use tracing::debug;

const DEFAULT_PORT: u16 = 3306;

pub struct MySqlDriver;

impl Driver for MySqlDriver {
    fn scheme(&self) -> &'static str {
        "mysql"
    }

    fn connect(&self, config: &ConnectConfig) -> DriverResult<Box<dyn Connection>> {
        let url = config.url();
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .unwrap_or("localhost");
        let port = url.port().unwrap_or(DEFAULT_PORT);
        let database = url.path().trim_start_matches('/');
        debug!(host, port, database, user = config.username(), "opening mysql session");

        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(host))
            .tcp_port(port)
            .db_name(Some(database).filter(|d| !d.is_empty()))
            .user(Some(config.username()))
            .pass(Some(config.password()));
        let conn = Conn::new(opts)?;

        Ok(Box::new(MySqlConnection { conn }))
    }
}

struct MySqlConnection {
    conn: Conn,
}

impl Connection for MySqlConnection {
    fn prepare(&mut self, sql: &str) -> DriverResult<Box<dyn Statement + '_>> {
        let stmt = self.conn.prep(sql)?;
        Ok(Box::new(MySqlStatement {
            conn: &mut self.conn,
            stmt,
        }))
    }

    fn close(self: Box<Self>) -> DriverResult<()> {
        // `Conn` says goodbye to the server when dropped.
        drop(self);
        Ok(())
    }
}

struct MySqlStatement<'c> {
    conn: &'c mut Conn,
    stmt: mysql::Statement,
}

impl Statement for MySqlStatement<'_> {
    fn query(&mut self) -> DriverResult<Box<dyn Cursor + '_>> {
        let result = self.conn.exec_iter(&self.stmt, ())?;
        Ok(Box::new(MySqlCursor {
            result,
            current: None,
        }))
    }

    fn close(self: Box<Self>) -> DriverResult<()> {
        let MySqlStatement { conn, stmt } = *self;
        conn.close(stmt)?;
        Ok(())
    }
}

struct MySqlCursor<'s> {
    result: QueryResult<'s, 's, 's, Binary>,
    current: Option<Row>,
}

impl Cursor for MySqlCursor<'_> {
    fn advance(&mut self) -> DriverResult<Option<&dyn Record>> {
        self.current = self.result.next().transpose()?;
        Ok(self.current.as_ref().map(|r| r as &dyn Record))
    }

    fn close(self: Box<Self>) -> DriverResult<()> {
        // Dropping the result drains whatever the server still sends.
        drop(self);
        Ok(())
    }
}

impl Record for Row {
    fn text(&self, column: &str) -> DriverResult<Option<String>> {
        let index = self
            .columns_ref()
            .iter()
            .position(|c| c.name_str() == column)
            .ok_or_else(|| format!("no column named `{column}` in result set"))?;
        let value = self
            .as_ref(index)
            .ok_or_else(|| format!("value of column `{column}` was already taken"))?;
        Ok(render(value))
    }
}

fn render(value: &Value) -> Option<String> {
    let text = match value {
        Value::NULL => return None,
        Value::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Value::Int(i) => i.to_string(),
        Value::UInt(u) => u.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Double(d) => d.to_string(),
        Value::Date(year, month, day, 0, 0, 0, 0) => format!("{year:04}-{month:02}-{day:02}"),
        Value::Date(year, month, day, hour, minute, second, 0) => {
            format!("{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}")
        }
        Value::Date(year, month, day, hour, minute, second, micros) => format!(
            "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}.{micros:06}"
        ),
        Value::Time(negative, days, hours, minutes, seconds, micros) => {
            let sign = if *negative { "-" } else { "" };
            let hours = u32::from(*hours) + days * 24;
            if *micros == 0 {
                format!("{sign}{hours:02}:{minutes:02}:{seconds:02}")
            } else {
                format!("{sign}{hours:02}:{minutes:02}:{seconds:02}.{micros:06}")
            }
        }
    };
    Some(text)
}
