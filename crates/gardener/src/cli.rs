//! Command-line surface
//!
//! One subcommand per user-facing operation. Exit codes: 0 success,
//! 1 user error, 2 capability or runtime failure.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Local-first codebase analysis assistant
#[derive(Debug, Parser)]
#[command(name = "gardener", version, about)]
pub struct Cli {
    /// Explicit configuration file (default: `<data_root>/config.toml`)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a source tree and build its project index
    Analyze {
        /// Force the advanced tier (training still needs its capability)
        #[arg(long)]
        advanced: bool,
        /// Directory to analyze
        dir: PathBuf,
    },
    /// Ask a question about the active (or given) project
    Chat {
        /// Project id (defaults to the active project)
        #[arg(long)]
        project: Option<String>,
        /// The question
        question: String,
    },
    /// Export the active project's latest analysis as Markdown
    Export {
        /// Output file (stdout when omitted)
        file: Option<PathBuf>,
    },
    /// Show the active project and system state
    Status,
    /// Show capability availability
    Features,
    /// List registered projects
    Projects,
    /// Manage projects
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
}

/// `project` subcommands
#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// Register a directory as a project without analyzing it
    Create {
        /// Display name
        name: String,
        /// Source directory
        path: PathBuf,
    },
    /// Show one project's record
    Info {
        /// Project id (defaults to the active project)
        id: Option<String>,
    },
    /// Make a project active and warm its adapter
    Switch {
        /// Project id
        id: String,
    },
    /// Remove a project and its on-disk data
    Cleanup {
        /// Project id
        id: String,
    },
    /// Check registry consistency and capability health
    Health,
}
