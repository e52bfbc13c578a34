//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tasksync_content::Priority;
use tasksync_core::CONFIG_FILE;

/// tasksync - Keep a task file and a Markdown note in step
#[derive(Parser, Debug)]
#[command(name = "tasksync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file
    #[arg(short, long, global = true, env = "TASKSYNC_CONFIG", default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Files one command works on
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Markdown document to sync
    #[arg(short, long)]
    pub document: PathBuf,

    /// JSON task file
    #[arg(short, long)]
    pub tasks: PathBuf,

    /// Directory for sync state [default: .tasksync/ beside the task file]
    #[arg(long)]
    pub state_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Merge document edits into the task file, then render it back
    Sync {
        #[command(flatten)]
        paths: Paths,
    },

    /// Merge document edits into the task file only
    Pull {
        #[command(flatten)]
        paths: Paths,
    },

    /// Render the task file into the document, ignoring document edits
    Push {
        #[command(flatten)]
        paths: Paths,
    },

    /// Quick capture: append one task line to the document
    ///
    /// The task gets its id on the next sync.
    ///
    /// Examples:
    ///   tasksync add "Buy milk" -d notes.md -t tasks.json
    ///   tasksync add "Ship it" --tag work --priority high -d notes.md -t tasks.json
    Add {
        /// Task text
        text: String,

        /// Tag to attach (repeatable); the first one groups the task
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Priority: lowest, low, normal, medium, high or highest
        #[arg(short, long)]
        priority: Option<Priority>,

        #[command(flatten)]
        paths: Paths,
    },

    /// Print the document the next sync would write, without writing
    Show {
        #[command(flatten)]
        paths: Paths,
    },
}
