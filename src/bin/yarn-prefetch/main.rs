//! yarn-prefetch CLI - hermetic prefetch of yarn classic dependencies

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use miette::Diagnostic as _;
use tracing_subscriber::EnvFilter;

use yarn_prefetch::ops::ErrorCategory;
use yarn_prefetch::util::diagnostic::emit;
use yarn_prefetch::PrefetchError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli) {
        std::process::exit(report(&e, color));
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("yarn_prefetch=debug")
    } else {
        EnvFilter::new("yarn_prefetch=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .without_time()
        .init();

    let config = cli.config.as_deref();

    // Execute command
    match cli.command {
        Commands::Fetch(args) => commands::fetch::execute(args, config),
        Commands::Check(args) => commands::check::execute(args, config),
        Commands::Env(args) => commands::env::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print `err` and pick the exit code: 2 for rejected repositories, 1 for
/// everything else.
fn report(err: &anyhow::Error, color: bool) -> i32 {
    match err.downcast_ref::<PrefetchError>() {
        Some(prefetch_err) => {
            let mut diag = prefetch_err.to_diagnostic();
            if let Some(code) = prefetch_err.code() {
                diag = diag.with_context(format!("code: {}", code));
            }
            emit(&diag, color);

            match prefetch_err.category() {
                ErrorCategory::Rejected => 2,
                ErrorCategory::PackageManager => 1,
            }
        }
        None => {
            eprintln!("error: {:#}", err);
            1
        }
    }
}
