//! Default command - build the matrix and run the driver over it
//!
//! nbacross [--list | --dry-run] [-- driver args...]

use super::Cli;
use crate::combinator::render;
use crate::config::{Overrides, Settings};
use crate::invocation::{DriverInvocation, OutputFiles};
use crate::paths;
use crate::relay::Relay;
use crate::util::ui;
use anyhow::{Context, Result};
use std::env;
use std::io::{self, Write};

/// Run nbacross; returns the exit code to leave with
pub fn run(cli: Cli) -> Result<i32> {
    let stamp = paths::run_stamp(&chrono::Local::now());
    let cwd = env::current_dir().context("Failed to determine current directory")?;

    // 1. Merge config layers and command-line flags
    let mut settings = Settings::load(cli.config.as_deref(), &cwd)?;
    settings.apply(
        &Overrides {
            driver: cli.driver,
            tool: cli.tool,
            baseline: cli.baseline,
            output_dir: cli.output_dir,
        },
        &cwd,
    );

    // 2. Expand the flag matrix (fails before anything is launched)
    let variants = settings
        .matrix
        .variants()
        .context("Invalid flag matrix")?;
    tracing::debug!(count = variants.len(), "expanded flag matrix");

    if cli.list {
        for line in render(&variants) {
            println!("{}", line);
        }
        return Ok(0);
    }

    // 3. Assemble the driver command line
    let tool = settings.resolve_tool()?;
    let outputs = OutputFiles {
        bogus: paths::bogus_file(settings.output_dir.as_deref(), &stamp),
        stats: paths::stats_file(settings.output_dir.as_deref(), &stamp),
    };
    let command_line = DriverInvocation {
        driver: &settings.driver,
        driver_args: &settings.driver_args,
        baseline: &settings.baseline,
        tool: &tool,
        variants: &variants,
        outputs: &outputs,
        passthrough: &cli.driver_args,
    }
    .command_line();
    tracing::debug!(command = %command_line, "assembled driver command line");

    if cli.dry_run {
        println!("{}", command_line);
        return Ok(0);
    }

    // 4. Launch and relay until the driver exits
    if let Some(dir) = &settings.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    ui::info(&format!(
        "Testing {} variants of {} (report: {}, stats: {})",
        variants.len(),
        tool.display(),
        outputs.bogus.display(),
        outputs.stats.display()
    ));

    let mut outcome = Relay::inherit()
        .forward_signals(true)
        .run(&command_line, io::stdin())?;
    outcome.stdout.flush().ok();
    outcome.stderr.flush().ok();
    tracing::info!(
        stdin_bytes = outcome.stdin_bytes,
        stdout_bytes = outcome.stdout_bytes,
        stderr_bytes = outcome.stderr_bytes,
        "relay finished"
    );

    let code = outcome.exit_code();
    if code == 0 {
        ui::success(&format!("Driver finished; statistics in {}", outputs.stats.display()));
    } else {
        ui::warn(&format!("Driver exited with status {}", code));
    }

    Ok(code)
}
