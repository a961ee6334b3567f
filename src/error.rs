use thiserror::Error;

/// Error reported by a driver; the runner attaches the phase it failed in.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type used by driver implementations
pub type DriverResult<T> = std::result::Result<T, BoxError>;

/// Every way a query run can fail, one variant per phase
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Invalid connection URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("No driver registered for scheme `{scheme}`{hint}", hint = driver_hint(scheme))]
    DriverNotFound { scheme: String },

    #[error("Cannot connect to {target}")]
    Connect {
        target: String,
        #[source]
        source: BoxError,
    },

    #[error("Cannot execute `{sql}`")]
    Execute {
        sql: String,
        #[source]
        source: BoxError,
    },

    #[error("Cannot fetch row {row}")]
    Fetch {
        row: usize,
        #[source]
        source: BoxError,
    },

    #[error("Cannot read column `{column}` of row {row} as text")]
    Decode {
        column: &'static str,
        row: usize,
        #[source]
        source: BoxError,
    },

    #[error("Cannot close {resource}")]
    Release {
        resource: Resource,
        #[source]
        source: BoxError,
    },

    #[error("Cannot write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Handles released at the end of a run, in release order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Cursor,
    Statement,
    Connection,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Resource::Cursor => "cursor",
            Resource::Statement => "statement",
            Resource::Connection => "connection",
        };
        write!(f, "{name}")
    }
}

fn driver_hint(scheme: &str) -> &'static str {
    if scheme == "mysql" && !cfg!(feature = "mysql") {
        " (rebuild with `--features mysql`)"
    } else {
        ""
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, QueryError>;
