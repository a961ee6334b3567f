//! Connectivity layer: one driver per URL scheme and the handles it hands out.
//!
//! The handles mirror the classic call sequence: a [`Driver`] opens a
//! [`Connection`], which prepares a [`Statement`], which opens a forward-only
//! [`Cursor`] yielding [`Record`]s. Every handle is released with an explicit
//! `close`, consuming it; dropping a handle releases it as well.

#[cfg(feature = "mysql")]
pub mod mysql;
pub mod sqlite;

use crate::config::ConnectConfig;
use crate::error::{DriverResult, QueryError, Result};

/// A single row, read column by column
pub trait Record {
    /// Value of `column` rendered as text, `None` for SQL NULL
    fn text(&self, column: &str) -> DriverResult<Option<String>>;
}

/// Forward-only, read-only cursor over a result set
pub trait Cursor {
    /// Move to the next row; `None` once the result set is exhausted
    fn advance(&mut self) -> DriverResult<Option<&dyn Record>>;

    fn close(self: Box<Self>) -> DriverResult<()>;
}

/// A prepared SQL command
pub trait Statement {
    /// Execute the statement and open a cursor over its rows
    fn query(&mut self) -> DriverResult<Box<dyn Cursor + '_>>;

    fn close(self: Box<Self>) -> DriverResult<()>;
}

/// A live session with a database server
pub trait Connection {
    fn prepare(&mut self, sql: &str) -> DriverResult<Box<dyn Statement + '_>>;

    fn close(self: Box<Self>) -> DriverResult<()>;
}

/// Knows how to connect for one URL scheme
pub trait Driver {
    fn scheme(&self) -> &'static str;

    fn connect(&self, config: &ConnectConfig) -> DriverResult<Box<dyn Connection>>;
}

/// Drivers known to this build, looked up by URL scheme
pub struct DriverRegistry {
    drivers: Vec<Box<dyn Driver>>,
}

impl DriverRegistry {
    /// Registry without any driver
    pub fn empty() -> Self {
        DriverRegistry {
            drivers: Vec::new(),
        }
    }

    /// Registry with every driver compiled into this build
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(sqlite::SqliteDriver));
        #[cfg(feature = "mysql")]
        registry.register(Box::new(mysql::MySqlDriver));
        registry
    }

    /// Add a driver, replacing any driver registered for the same scheme
    pub fn register(&mut self, driver: Box<dyn Driver>) {
        self.drivers.retain(|d| d.scheme() != driver.scheme());
        self.drivers.push(driver);
    }

    /// Find the driver for `scheme`
    pub fn resolve(&self, scheme: &str) -> Result<&dyn Driver> {
        self.drivers
            .iter()
            .find(|d| d.scheme() == scheme)
            .map(|d| d.as_ref())
            .ok_or_else(|| QueryError::DriverNotFound {
                scheme: scheme.to_string(),
            })
    }
}
