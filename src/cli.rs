use crate::config::DEFAULT_URL;
use crate::models::StatusFilter;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "edutasks")]
#[command(about = "List the tasks table of a relational database")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Connection URL, e.g. mysql://localhost:3306/eduTasksDB or sqlite:tasks.db
    #[arg(long, env = "EDUTASKS_DB_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Database user (overrides the URL)
    #[arg(long, env = "EDUTASKS_DB_USER")]
    pub user: Option<String>,

    /// Database password (overrides the URL)
    #[arg(long, env = "EDUTASKS_DB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Only print tasks of this subject
    #[arg(long)]
    pub subject: Option<String>,

    /// Only print tasks whose title or subject contains this text
    #[arg(long)]
    pub search: Option<String>,

    /// Only print tasks with this deadline status
    #[arg(long, value_enum, default_value_t = StatusFilter::All)]
    pub status: StatusFilter,

    /// Print deadline counts before the success line
    #[arg(long)]
    pub summary: bool,
}
