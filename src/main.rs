mod cli;
mod combinator;
mod config;
mod invocation;
mod matrix;
mod paths;
mod relay;
mod util;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            util::ui::error(&format!("{:#}", e));
            1
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    cli::run::run(cli)
}

/// Structured logging on stderr; NBACROSS_LOG takes precedence over --verbose
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("NBACROSS_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
