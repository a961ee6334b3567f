use crate::config::ConnectConfig;
use crate::db::{Connection, Cursor, DriverRegistry, Record, Statement};
use crate::error::{QueryError, Resource, Result};
use crate::models::{TASK_COLUMNS, TaskFilter, TaskRow, TaskSummary};
use chrono::{Local, NaiveDate};
use std::io::Write;
use tracing::{debug, info, trace, warn};

/// The one query this program runs
pub const TASKS_QUERY: &str = "SELECT * FROM tasks";

/// Written after every successful run
pub const SUCCESS_LINE: &str = "Task query executed successfully!";

/// Optional behaviour on top of the plain listing
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub filter: TaskFilter,
    /// Write a deadline summary before the success line
    pub summary: bool,
    /// Reference day for deadline classification; defaults to the local date
    pub today: Option<NaiveDate>,
}

/// What a successful run saw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Rows read from the cursor, printed or not
    pub rows_read: usize,
    /// Counts over the printed rows
    pub printed: TaskSummary,
}

/// Connects, runs [`TASKS_QUERY`], prints every row and releases the cursor,
/// the statement and the connection in that order.
pub struct QueryRunner<'r> {
    registry: &'r DriverRegistry,
    config: ConnectConfig,
    options: RunOptions,
}

impl<'r> QueryRunner<'r> {
    pub fn new(registry: &'r DriverRegistry, config: ConnectConfig) -> Self {
        QueryRunner {
            registry,
            config,
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Run once, writing task lines and the success line to `out`.
    ///
    /// Any failure stops the run: lines already written stay written and the
    /// success line is not written. Handles acquired before the failure are
    /// still closed; the first error is the one returned.
    pub fn run<W: Write>(&self, out: &mut W) -> Result<RunReport> {
        let today = self
            .options
            .today
            .unwrap_or_else(|| Local::now().date_naive());

        let driver = self.registry.resolve(self.config.scheme())?;
        info!(db = %self.config.target(), "connecting");
        let mut conn = driver
            .connect(&self.config)
            .map_err(|source| QueryError::Connect {
                target: self.config.target(),
                source,
            })?;

        let outcome = self.run_statement(conn.as_mut(), today, out);
        let released = conn.close().map_err(|source| QueryError::Release {
            resource: Resource::Connection,
            source,
        });
        debug!("connection closed");
        let report = first_error(outcome, released)?;

        if self.options.summary {
            writeln!(out, "{}", report.printed)?;
        }
        writeln!(out, "{SUCCESS_LINE}")?;
        out.flush()?;

        info!(rows = report.rows_read, printed = report.printed.total, "query finished");
        Ok(report)
    }

    fn run_statement<W: Write>(
        &self,
        conn: &mut dyn Connection,
        today: NaiveDate,
        out: &mut W,
    ) -> Result<RunReport> {
        let mut stmt = conn.prepare(TASKS_QUERY).map_err(execute_error)?;
        let outcome = self.run_cursor(stmt.as_mut(), today, out);
        let released = stmt.close().map_err(|source| QueryError::Release {
            resource: Resource::Statement,
            source,
        });
        debug!("statement closed");
        first_error(outcome, released)
    }

    fn run_cursor<W: Write>(
        &self,
        stmt: &mut dyn Statement,
        today: NaiveDate,
        out: &mut W,
    ) -> Result<RunReport> {
        let mut cursor = stmt.query().map_err(execute_error)?;
        let outcome = self.print_rows(cursor.as_mut(), today, out);
        let released = cursor.close().map_err(|source| QueryError::Release {
            resource: Resource::Cursor,
            source,
        });
        debug!("cursor closed");
        first_error(outcome, released)
    }

    fn print_rows<W: Write>(
        &self,
        cursor: &mut dyn Cursor,
        today: NaiveDate,
        out: &mut W,
    ) -> Result<RunReport> {
        let mut report = RunReport::default();

        loop {
            let row = report.rows_read + 1;
            let record = match cursor
                .advance()
                .map_err(|source| QueryError::Fetch { row, source })?
            {
                Some(record) => record,
                None => break,
            };
            let task = read_task(record, row)?;
            report.rows_read = row;

            if !self.options.filter.matches(&task, today) {
                trace!(row, "filtered out");
                continue;
            }
            report.printed.record(task.deadline_status(today));
            writeln!(out, "{task}")?;
        }

        Ok(report)
    }
}

fn read_task(record: &dyn Record, row: usize) -> Result<TaskRow> {
    let column = |name: &'static str| {
        record
            .text(name)
            .map_err(|source| QueryError::Decode {
                column: name,
                row,
                source,
            })
    };

    let [title, subject, deadline] = TASK_COLUMNS.map(column);
    Ok(TaskRow {
        title: title?,
        subject: subject?,
        deadline: deadline?,
    })
}

fn execute_error(source: crate::error::BoxError) -> QueryError {
    QueryError::Execute {
        sql: TASKS_QUERY.to_string(),
        source,
    }
}

fn first_error<T>(outcome: Result<T>, released: Result<()>) -> Result<T> {
    match (outcome, released) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) | (Err(e), Ok(())) => Err(e),
        (Err(e), Err(late)) => {
            warn!(error = %late, "release failed after an earlier error");
            Err(e)
        }
    }
}
