use clap::Parser;
use edutasks::cli::Cli;
use edutasks::cli_handlers;
use tracing_subscriber::EnvFilter;

fn main() {
    // Diagnostics go to stderr so stdout only carries task lines.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // A failed run is reported, not signalled through the exit status.
    if let Err(e) = cli_handlers::handle_query(cli) {
        eprintln!("Error: {:?}", anyhow::Error::new(e));
    }
}
