//! Generation ledger.
//!
//! Every generated daily report is recorded with the BLAKE3 hash of the
//! notes it came from. Before calling the completion API again, the
//! generator asks the ledger whether the same notes already produced a
//! report that is still on disk.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// One recorded generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    /// Row ID (assigned by the ledger).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// The note file the report was generated from.
    pub source_path: PathBuf,
    /// BLAKE3 hash of the note content.
    pub content_hash: String,
    /// Day the report covers.
    pub report_date: NaiveDate,
    /// Where the report was written.
    pub output_path: PathBuf,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
}

impl Generation {
    /// Create a record stamped with the current time.
    #[must_use]
    pub fn new(
        source_path: impl Into<PathBuf>,
        content_hash: impl Into<String>,
        report_date: NaiveDate,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: None,
            source_path: source_path.into(),
            content_hash: content_hash.into(),
            report_date,
            output_path: output_path.into(),
            generated_at: Utc::now(),
        }
    }
}

/// `SQLite`-backed ledger of generated reports.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    conn: Connection,
}

const SELECT_COLUMNS: &str =
    "SELECT id, source_path, content_hash, report_date, output_path, generated_at FROM generations";

impl Ledger {
    /// Open or create a ledger at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening ledger at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        Ok(Self { path, conn })
    }

    /// Create an in-memory ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a generation and return its row ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn record(&self, generation: &Generation) -> Result<i64> {
        self.conn.execute(
            r"
            INSERT INTO generations
                (source_path, content_hash, report_date, output_path, generated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                generation.source_path.to_string_lossy(),
                generation.content_hash,
                generation.report_date.format("%Y-%m-%d").to_string(),
                generation.output_path.to_string_lossy(),
                generation.generated_at.to_rfc3339(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(id, hash = short_hash(&generation.content_hash), "Recorded generation");
        Ok(id)
    }

    /// Whether `source` with `hash` already produced `output`, and that
    /// output still exists on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn is_current(&self, source: &Path, hash: &str, output: &Path) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            r"
            SELECT COUNT(*) FROM generations
            WHERE source_path = ?1 AND content_hash = ?2 AND output_path = ?3
            ",
            params![
                source.to_string_lossy(),
                hash,
                output.to_string_lossy()
            ],
            |row| row.get(0),
        )?;
        Ok(count > 0 && output.exists())
    }

    /// Most recent generation for a source file.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn latest_for(&self, source: &Path) -> Result<Option<Generation>> {
        let sql = format!("{SELECT_COLUMNS} WHERE source_path = ?1 ORDER BY id DESC LIMIT 1");
        let found = self
            .conn
            .query_row(&sql, [source.to_string_lossy()], Self::row_to_generation)
            .optional()?;
        Ok(found)
    }

    /// Most recent generations, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn recent(&self, limit: usize) -> Result<Vec<Generation>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY id DESC LIMIT ?1");
        let mut stmt = self.conn.prepare(&sql)?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map([limit_i64], Self::row_to_generation)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Number of recorded generations.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM generations", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete records generated more than `days` days ago.
    ///
    /// Returns the number of records deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn prune_older_than(&self, days: u32) -> Result<usize> {
        let cutoff = (Utc::now() - Duration::days(i64::from(days))).to_rfc3339();
        let affected = self
            .conn
            .execute("DELETE FROM generations WHERE generated_at < ?1", [cutoff])?;
        if affected > 0 {
            info!("Pruned {} old ledger entries", affected);
        }
        Ok(affected)
    }

    fn row_to_generation(row: &rusqlite::Row) -> rusqlite::Result<Generation> {
        let id: i64 = row.get(0)?;
        let source_path: String = row.get(1)?;
        let content_hash: String = row.get(2)?;
        let report_date: String = row.get(3)?;
        let output_path: String = row.get(4)?;
        let generated_at: String = row.get(5)?;

        let report_date = NaiveDate::parse_from_str(&report_date, "%Y-%m-%d").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let generated_at = DateTime::parse_from_rfc3339(&generated_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
            })?;

        Ok(Generation {
            id: Some(id),
            source_path: PathBuf::from(source_path),
            content_hash,
            report_date,
            output_path: PathBuf::from(output_path),
            generated_at,
        })
    }
}

/// Leading 16 characters of a hash, for log lines.
fn short_hash(hash: &str) -> &str {
    hash.char_indices().nth(16).map_or(hash, |(end, _)| &hash[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 17).unwrap()
    }

    #[test]
    fn test_open_in_memory() {
        let ledger = Ledger::open_in_memory().unwrap();
        assert_eq!(ledger.path(), Path::new(":memory:"));
        assert_eq!(ledger.count().unwrap(), 0);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ledger.db");
        let ledger = Ledger::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(ledger.path(), path);
    }

    #[test]
    fn test_record_and_latest() {
        let ledger = Ledger::open_in_memory().unwrap();
        let first = Generation::new("notes/a.md", "h1", day(), "reports/daily/2026-02-17.md");
        let second = Generation::new("notes/a.md", "h2", day(), "reports/daily/2026-02-17.md");

        let id1 = ledger.record(&first).unwrap();
        let id2 = ledger.record(&second).unwrap();
        assert!(id2 > id1);

        let latest = ledger.latest_for(Path::new("notes/a.md")).unwrap().unwrap();
        assert_eq!(latest.id, Some(id2));
        assert_eq!(latest.content_hash, "h2");
        assert_eq!(latest.report_date, day());
        assert!(ledger.latest_for(Path::new("notes/b.md")).unwrap().is_none());
    }

    #[test]
    fn test_short_hash() {
        assert_eq!(short_hash("h1"), "h1");
        assert_eq!(short_hash(&"a".repeat(64)), "a".repeat(16));
        assert_eq!(short_hash("ééééééééééééééééé"), "éééééééééééééééé");
    }

    #[test]
    fn test_record_multibyte_hash() {
        crate::logging::init_test_logging();
        let ledger = Ledger::open_in_memory().unwrap();
        let hash = "aaaaaaaaaaaaaaaé-not-hex";
        ledger
            .record(&Generation::new("notes/a.md", hash, day(), "reports/daily/2026-02-17.md"))
            .unwrap();
        let latest = ledger.latest_for(Path::new("notes/a.md")).unwrap().unwrap();
        assert_eq!(latest.content_hash, hash);
    }

    #[test]
    fn test_is_current_requires_output_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("note.md");
        let output = dir.path().join("report.md");

        let ledger = Ledger::open_in_memory().unwrap();
        ledger
            .record(&Generation::new(&source, "abc", day(), &output))
            .unwrap();

        assert!(!ledger.is_current(&source, "abc", &output).unwrap());

        std::fs::write(&output, "# report\n").unwrap();
        assert!(ledger.is_current(&source, "abc", &output).unwrap());
        assert!(!ledger.is_current(&source, "other", &output).unwrap());
        assert!(!ledger
            .is_current(&source, "abc", &dir.path().join("elsewhere.md"))
            .unwrap());
    }

    #[test]
    fn test_recent_orders_newest_first() {
        let ledger = Ledger::open_in_memory().unwrap();
        for hash in ["a", "b", "c"] {
            ledger
                .record(&Generation::new("n.md", hash, day(), "r.md"))
                .unwrap();
        }

        let recent = ledger.recent(2).unwrap();
        let hashes: Vec<_> = recent.iter().map(|g| g.content_hash.as_str()).collect();
        assert_eq!(hashes, vec!["c", "b"]);
    }

    #[test]
    fn test_prune_older_than() {
        let ledger = Ledger::open_in_memory().unwrap();
        let mut old = Generation::new("n.md", "old", day(), "r.md");
        old.generated_at = Utc::now() - Duration::days(90);
        ledger.record(&old).unwrap();
        ledger
            .record(&Generation::new("n.md", "new", day(), "r.md"))
            .unwrap();

        assert_eq!(ledger.prune_older_than(30).unwrap(), 1);
        assert_eq!(ledger.count().unwrap(), 1);
    }
}
