use crate::cli::Cli;
use crate::config::ConnectConfig;
use crate::core::{QueryRunner, RunOptions, RunReport};
use crate::db::DriverRegistry;
use crate::error::QueryError;
use crate::models::TaskFilter;
use std::io;

/// Handle a parsed command line: list the tasks table to stdout
pub fn handle_query(cli: Cli) -> Result<RunReport, QueryError> {
    let config = ConnectConfig::new(&cli.url, cli.user, cli.password)?;
    let options = RunOptions {
        filter: TaskFilter {
            subject: cli.subject,
            search: cli.search,
            status: cli.status,
        },
        summary: cli.summary,
        today: None,
    };

    let registry = DriverRegistry::builtin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    QueryRunner::new(&registry, config)
        .with_options(options)
        .run(&mut out)
}
