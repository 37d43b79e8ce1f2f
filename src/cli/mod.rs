use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nbacross")]
#[command(about = "Cross-check nbadet flag combinations against a baseline with autcross")]
#[command(version)]
pub struct Cli {
    /// Project config file (default: ./nbacross.toml if present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Differential-testing driver to launch
    #[arg(long, value_name = "PROGRAM")]
    pub driver: Option<String>,

    /// Tool under test
    #[arg(long, value_name = "PATH")]
    pub tool: Option<String>,

    /// Baseline translator every variant is compared against
    #[arg(long, value_name = "CMD")]
    pub baseline: Option<String>,

    /// Directory for the bug report and statistics files
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print the flag variants, one per line, and exit
    #[arg(long, conflicts_with = "dry_run")]
    pub list: bool,

    /// Print the driver command line and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Additional arguments forwarded to the driver (put `--` before them
    /// if the first one starts with `-`)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub driver_args: Vec<String>,
}

pub mod run;
