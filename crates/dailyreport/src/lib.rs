//! `dailyreport` - Turn rough notes into structured daily reports
//!
//! This library manages a workspace of scratch notes and generated reports.
//! Notes are sent to a chat-completion API, the answer is cleaned of
//! reasoning output and forced into a fixed section layout, and a hash
//! ledger skips regeneration when notes have not changed. Daily reports
//! are aggregated into weekly summaries, and the workspace can be synced
//! with git.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod ledger;
pub mod logging;
pub mod note;
pub mod report;
pub mod sync;
pub mod weekly;
pub mod workspace;

pub use api::{CompletionClient, HttpTransport, Transport};
pub use config::Config;
pub use error::{Error, Result};
pub use generator::{generate_report, GenerateOutcome, GenerateRequest, ReportGenerator};
pub use ledger::{Generation, Ledger};
pub use logging::init_logging;
pub use note::{format_file_size, NoteEntry, SourceType, TextStats};
pub use sync::{GitSync, SyncReport};
pub use weekly::{write_weekly_summary, IsoWeek, WeeklySummary};
pub use workspace::{filter_entries, EntryKind, FileEntry, Workspace};
