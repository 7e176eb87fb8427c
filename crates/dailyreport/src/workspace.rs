//! The on-disk workspace holding scratch notes and generated reports.
//!
//! Layout (all directories configurable):
//!
//! ```text
//! <root>/notes/<date>-<slug>.md          scratch notes
//! <root>/reports/daily/<date>.md         generated daily reports
//! <root>/reports/weekly/<year>-W<ww>.md  weekly summaries
//! ```

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::note::{slugify, NoteEntry};

/// A markdown file found in the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Full path to the file.
    pub path: PathBuf,
    /// File name, including the extension.
    pub name: String,
    /// Last modification time.
    pub modified: DateTime<Local>,
    /// Size in bytes.
    pub size: u64,
    /// First `# ` heading, for reports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Date parsed from the file name, for reports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// The two kinds of file a user browses and manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Scratch notes under the notes directory.
    Notes,
    /// Generated daily reports.
    Reports,
}

/// Resolved workspace directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
    notes_dir: PathBuf,
    daily_dir: PathBuf,
    weekly_dir: PathBuf,
}

impl Workspace {
    /// Build a workspace with the default layout under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            notes_dir: root.join("notes"),
            daily_dir: root.join("reports").join("daily"),
            weekly_dir: root.join("reports").join("weekly"),
            root,
        }
    }

    /// Build a workspace from configuration. Relative directories are
    /// resolved against the workspace root.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let root = config.workspace_root();
        Self {
            notes_dir: root.join(&config.workspace.notes_dir),
            daily_dir: root.join(&config.workspace.daily_dir),
            weekly_dir: root.join(&config.workspace.weekly_dir),
            root,
        }
    }

    /// Workspace root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scratch notes directory.
    #[must_use]
    pub fn notes_dir(&self) -> &Path {
        &self.notes_dir
    }

    /// Daily reports directory.
    #[must_use]
    pub fn daily_dir(&self) -> &Path {
        &self.daily_dir
    }

    /// Weekly summaries directory.
    #[must_use]
    pub fn weekly_dir(&self) -> &Path {
        &self.weekly_dir
    }

    /// Path of the daily report for `date`.
    #[must_use]
    pub fn daily_report_path(&self, date: NaiveDate) -> PathBuf {
        self.daily_dir.join(format!("{}.md", date.format("%Y-%m-%d")))
    }

    /// Path of the weekly summary for an ISO week.
    #[must_use]
    pub fn weekly_summary_path(&self, year: i32, week: u32) -> PathBuf {
        self.weekly_dir.join(format!("{year}-W{week:02}.md"))
    }

    /// Create a new scratch note from the note template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoteExists`] if the note is already there, or an I/O
    /// error if it cannot be written.
    pub fn create_scratch_note(&self, name: &str, date: NaiveDate) -> Result<PathBuf> {
        ensure_dir(&self.notes_dir)?;

        let file_name = format!("{}-{}.md", date.format("%Y-%m-%d"), slugify(name));
        let path = self.notes_dir.join(file_name);
        if path.exists() {
            return Err(Error::NoteExists { path });
        }

        let title = (!name.trim().is_empty()).then(|| name.trim().to_string());
        std::fs::write(&path, NoteEntry::new(date, title).render())?;

        info!("Created scratch note {}", path.display());
        Ok(path)
    }

    /// List scratch notes, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn list_scratch_files(&self) -> Result<Vec<FileEntry>> {
        list_markdown(&self.notes_dir, false)
    }

    /// List daily reports with their titles and dates, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or a report cannot be read.
    pub fn list_daily_reports(&self) -> Result<Vec<FileEntry>> {
        list_markdown(&self.daily_dir, true)
    }

    /// List notes or reports, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or a report cannot be read.
    pub fn list(&self, kind: EntryKind) -> Result<Vec<FileEntry>> {
        match kind {
            EntryKind::Notes => self.list_scratch_files(),
            EntryKind::Reports => self.list_daily_reports(),
        }
    }

    /// Delete the note or report called `name` and return its path.
    ///
    /// `name` must be a plain file name inside the directory for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEntryName`] for names that would reach outside
    /// the directory, [`Error::InputNotFound`] if no such file exists, or an
    /// I/O error if it cannot be removed.
    pub fn delete_entry(&self, kind: EntryKind, name: &str) -> Result<PathBuf> {
        let plain = Path::new(name)
            .file_name()
            .is_some_and(|file| file == std::ffi::OsStr::new(name));
        if !plain {
            return Err(Error::InvalidEntryName {
                name: name.to_string(),
            });
        }

        let dir = match kind {
            EntryKind::Notes => &self.notes_dir,
            EntryKind::Reports => &self.daily_dir,
        };
        let path = dir.join(name);
        if !path.is_file() {
            return Err(Error::InputNotFound { path });
        }

        std::fs::remove_file(&path)?;
        info!("Deleted {}", path.display());
        Ok(path)
    }

    /// Daily reports whose file-name date lies in `[start, end]`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn daily_reports_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, PathBuf)>> {
        let mut found: Vec<(NaiveDate, PathBuf)> = self
            .list_daily_reports()?
            .into_iter()
            .filter_map(|entry| entry.date.map(|d| (d, entry.path)))
            .filter(|(d, _)| *d >= start && *d <= end)
            .collect();
        found.sort_by_key(|(d, _)| *d);
        debug!("Found {} daily reports between {start} and {end}", found.len());
        Ok(found)
    }
}

/// Keep entries whose name contains `needle`, ignoring case.
#[must_use]
pub fn filter_entries(entries: Vec<FileEntry>, needle: &str) -> Vec<FileEntry> {
    if needle.is_empty() {
        return entries;
    }
    let needle = needle.to_lowercase();
    entries
        .into_iter()
        .filter(|e| e.name.to_lowercase().contains(&needle))
        .collect()
}

/// Create `dir` and its parents if missing.
pub(crate) fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// First `# ` heading of a markdown document.
fn first_title(text: &str) -> Option<String> {
    text.lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_string())
}

/// Date encoded at the start of a file stem, e.g. `2026-02-17.md`.
fn date_from_name(name: &str) -> Option<NaiveDate> {
    let stem = name.strip_suffix(".md").unwrap_or(name);
    stem.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

fn list_markdown(dir: &Path, with_report_meta: bool) -> Result<Vec<FileEntry>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for item in std::fs::read_dir(dir)? {
        let item = item?;
        let path = item.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }

        let meta = item.metadata()?;
        let modified: DateTime<Local> = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH).into();
        let name = item.file_name().to_string_lossy().into_owned();

        let (title, date) = if with_report_meta {
            let text = std::fs::read_to_string(&path)?;
            (
                Some(first_title(&text).unwrap_or_else(|| "N/A".to_string())),
                date_from_name(&name),
            )
        } else {
            (None, None)
        };

        entries.push(FileEntry {
            path,
            name,
            modified,
            size: meta.len(),
            title,
            date,
        });
    }

    entries.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.name.cmp(&a.name)));
    Ok(entries)
}
