pub mod cli;
pub mod cli_handlers;
pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod models;

pub use config::ConnectConfig;
pub use crate::core::{QueryRunner, RunOptions, RunReport};
pub use error::{QueryError, Result};
pub use models::*;
