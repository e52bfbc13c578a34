//! tasksync CLI
//!
//! Keeps a JSON task file and a hand-edited Markdown note in step.

mod cli;
mod commands;
mod error;
mod logging;
mod workspace;

use clap::Parser;
use colored::Colorize;
use tasksync_core::CycleMode;

use cli::{Cli, Commands};
use error::{CliError, Result};
use workspace::Workspace;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)
        .map_err(|e| CliError::user(format!("Failed to set up logging: {e}")))?;
    tracing::debug!("Verbose mode enabled");

    match cli.command {
        Commands::Sync { paths } => {
            commands::run_cycle(&Workspace::open(&cli.config, &paths)?, CycleMode::Full)
        }
        Commands::Pull { paths } => {
            commands::run_cycle(&Workspace::open(&cli.config, &paths)?, CycleMode::PullOnly)
        }
        Commands::Push { paths } => {
            commands::run_cycle(&Workspace::open(&cli.config, &paths)?, CycleMode::PushOnly)
        }
        Commands::Add {
            text,
            tags,
            priority,
            paths,
        } => commands::run_add(&Workspace::open(&cli.config, &paths)?, &text, priority, &tags),
        Commands::Show { paths } => commands::run_show(&Workspace::open(&cli.config, &paths)?),
    }
}
