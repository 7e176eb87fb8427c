//! Command-line interface for dailyreport.
//!
//! This module provides the CLI structure for the `dreport` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DeleteCommand, GenerateCommand, HistoryCommand, ListCommand, ListKind,
    NewCommand, SourceTypeArg, StatsCommand, SyncCommand, WeeklyCommand,
};

use crate::logging::Verbosity;

/// dreport - Turn rough notes into structured daily reports
///
/// Keeps scratch notes, generates daily reports through a chat-completion
/// API, aggregates them into weekly summaries and syncs the workspace
/// with git.
#[derive(Debug, Parser)]
#[command(name = "dreport")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Workspace directory (overrides the configured root)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a scratch note from the template
    New(NewCommand),

    /// List scratch notes or daily reports
    List(ListCommand),

    /// Delete scratch notes or daily reports
    Delete(DeleteCommand),

    /// Generate a daily report from a note
    Generate(GenerateCommand),

    /// Summarize a week of daily reports
    Weekly(WeeklyCommand),

    /// Show recent report generations
    History(HistoryCommand),

    /// Commit, pull and push the workspace
    Sync(SyncCommand),

    /// Show word count, reading time and size of a file
    Stats(StatsCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
