mod audio;
mod board;
mod cli;
mod config;
mod feed;
mod marquee;
mod model;
mod notify;
mod queue;

use std::process;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `QUEUEBOARD_LOG=debug`.
const LOG_ENV: &str = "QUEUEBOARD_LOG";

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = cli::run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
