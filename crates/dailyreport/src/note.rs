//! Note entries and small text helpers.
//!
//! A note entry is a dated free-text journal record: a heading carrying the
//! date, an optional title, and a list of bullets. Notes are the raw input
//! that daily reports are generated from.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HEADING_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("valid date regex"));

/// Where the raw notes came from. Passed through to the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Written by hand.
    #[default]
    Manual,
    /// Taken from a commit message.
    Commit,
    /// Taken from an issue thread.
    Issue,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::Commit => write!(f, "commit"),
            Self::Issue => write!(f, "issue"),
        }
    }
}

/// Turn a free-form name into a file-name-safe slug.
///
/// Keeps ASCII letters, digits, `-`, `_` and CJK ideographs; everything else
/// becomes a single dash. Returns `"note"` if nothing survives.
#[must_use]
pub fn slugify(s: &str) -> String {
    let lowered = s.trim().to_lowercase();

    let mut out = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        let keep = c.is_ascii_lowercase()
            || c.is_ascii_digit()
            || c == '-'
            || c == '_'
            || ('\u{4e00}'..='\u{9fff}').contains(&c);
        if keep {
            if c == '-' && out.ends_with('-') {
                continue;
            }
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }

    let slug = out.trim_matches('-');
    if slug.is_empty() {
        "note".to_string()
    } else {
        slug.to_string()
    }
}

/// Compute the BLAKE3 hash of the given content.
#[must_use]
pub fn content_hash(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}

/// A dated journal record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEntry {
    /// Day the note belongs to.
    pub date: NaiveDate,
    /// Optional title shown under the date heading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Bullet items, without their list markers.
    pub bullets: Vec<String>,
}

impl NoteEntry {
    /// Create an empty entry for the given day.
    #[must_use]
    pub fn new(date: NaiveDate, title: Option<String>) -> Self {
        Self {
            date,
            title,
            bullets: Vec::new(),
        }
    }

    /// Parse a note file.
    ///
    /// The date is taken from the first `# ` heading that contains a
    /// `YYYY-MM-DD` date, falling back to `default_date`. The title is the
    /// first `## ` heading. Bullets are lines starting with `-` or `*`;
    /// empty bullets are dropped.
    #[must_use]
    pub fn parse(text: &str, default_date: NaiveDate) -> Self {
        let mut date = None;
        let mut title = None;
        let mut bullets = Vec::new();

        for line in text.lines() {
            let trimmed = line.trim();
            if let Some(heading) = trimmed.strip_prefix("## ") {
                if title.is_none() {
                    title = Some(heading.trim().to_string());
                }
            } else if let Some(heading) = trimmed.strip_prefix("# ") {
                if date.is_none() {
                    date = HEADING_DATE_RE
                        .find(heading)
                        .and_then(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok());
                }
            } else if let Some(item) = trimmed
                .strip_prefix("- ")
                .or_else(|| trimmed.strip_prefix("* "))
            {
                let item = item.trim();
                if !item.is_empty() {
                    bullets.push(item.to_string());
                }
            }
        }

        Self {
            date: date.unwrap_or(default_date),
            title,
            bullets,
        }
    }

    /// Render the entry as markdown.
    ///
    /// An entry without bullets renders a single empty bullet to type into.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("# Notes - {}\n\n", self.date.format("%Y-%m-%d"));
        if let Some(title) = &self.title {
            out.push_str(&format!("## {title}\n\n"));
        }
        if self.bullets.is_empty() {
            out.push_str("- \n");
        } else {
            for bullet in &self.bullets {
                out.push_str(&format!("- {bullet}\n"));
            }
        }
        out
    }
}

/// Word/line counts and reading time for a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextStats {
    /// Whitespace-separated words.
    pub words: usize,
    /// Lines of text.
    pub lines: usize,
    /// Estimated reading time at 200 words per minute, rounded up.
    pub reading_minutes: usize,
}

impl TextStats {
    /// Words per minute used for the reading estimate.
    pub const WORDS_PER_MINUTE: usize = 200;

    /// Compute statistics for `text`.
    #[must_use]
    pub fn of(text: &str) -> Self {
        let words = text.split_whitespace().count();
        let lines = text.lines().count();
        let reading_minutes = if text.trim().is_empty() {
            0
        } else {
            words.div_ceil(Self::WORDS_PER_MINUTE).max(1)
        };
        Self {
            words,
            lines,
            reading_minutes,
        }
    }
}

/// Format a byte count as `B`, `KB`, `MB` or `GB`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size < KB {
        format!("{size}B")
    } else if size < MB {
        format!("{:.1}KB", size as f64 / KB as f64)
    } else if size < GB {
        format!("{:.1}MB", size as f64 / MB as f64)
    } else {
        format!("{:.1}GB", size as f64 / GB as f64)
    }
}
