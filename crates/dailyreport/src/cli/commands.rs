//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::note::SourceType;
use crate::sync::DEFAULT_SYNC_MESSAGE;
use crate::workspace::EntryKind;

/// Parse a `YYYY-MM-DD` date argument.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

/// New scratch note arguments.
#[derive(Debug, Args)]
pub struct NewCommand {
    /// Note name, used for the title and file name
    #[arg(default_value = "note")]
    pub name: String,

    /// Note date (defaults to today)
    #[arg(short, long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
}

/// Which workspace files to list or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListKind {
    /// Scratch notes
    Notes,
    /// Daily reports
    Reports,
}

impl From<ListKind> for EntryKind {
    fn from(kind: ListKind) -> Self {
        match kind {
            ListKind::Notes => Self::Notes,
            ListKind::Reports => Self::Reports,
        }
    }
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// What to list
    #[arg(value_enum)]
    pub kind: ListKind,

    /// Only show files whose name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// What to delete
    #[arg(value_enum)]
    pub kind: ListKind,

    /// File names as shown by `list`
    #[arg(required = true, value_name = "NAME")]
    pub names: Vec<String>,
}

/// Source type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SourceTypeArg {
    /// Handwritten notes
    #[default]
    Manual,
    /// Commit messages
    Commit,
    /// Issue threads
    Issue,
}

impl From<SourceTypeArg> for SourceType {
    fn from(arg: SourceTypeArg) -> Self {
        match arg {
            SourceTypeArg::Manual => Self::Manual,
            SourceTypeArg::Commit => Self::Commit,
            SourceTypeArg::Issue => Self::Issue,
        }
    }
}

/// Generate command arguments.
#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// Note file to turn into a report
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Report destination (defaults to reports/daily/<date>.md)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Report date (defaults to today)
    #[arg(short, long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Where the notes came from
    #[arg(long, value_enum, default_value = "manual")]
    pub source_type: SourceTypeArg,

    /// Identifier of the source, e.g. a commit hash
    #[arg(long, default_value = "local")]
    pub source_id: String,

    /// Regenerate even if the notes are unchanged
    #[arg(short, long)]
    pub force: bool,
}

/// Weekly summary arguments.
#[derive(Debug, Args)]
pub struct WeeklyCommand {
    /// ISO year (defaults to the current ISO year)
    #[arg(long)]
    pub year: Option<i32>,

    /// ISO week number (defaults to the current week)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=53))]
    pub week: Option<u32>,

    /// Summary destination (defaults to reports/weekly/<year>-W<ww>.md)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// History command arguments.
#[derive(Debug, Args)]
pub struct HistoryCommand {
    /// Maximum number of entries
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Delete entries older than this many days first
    #[arg(long, value_name = "DAYS")]
    pub prune: Option<u32>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Sync command arguments.
#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Commit message
    #[arg(short, long, default_value = DEFAULT_SYNC_MESSAGE)]
    pub message: String,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// File to inspect
    pub file: PathBuf,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_type_arg_conversion() {
        assert_eq!(SourceType::from(SourceTypeArg::Manual), SourceType::Manual);
        assert_eq!(SourceType::from(SourceTypeArg::Commit), SourceType::Commit);
        assert_eq!(SourceType::from(SourceTypeArg::Issue), SourceType::Issue);
    }

    #[test]
    fn test_list_kind_conversion() {
        assert_eq!(EntryKind::from(ListKind::Notes), EntryKind::Notes);
        assert_eq!(EntryKind::from(ListKind::Reports), EntryKind::Reports);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2026-02-17"),
            Ok(NaiveDate::from_ymd_opt(2026, 2, 17).unwrap())
        );
        assert!(parse_date("17/02/2026").is_err());
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
