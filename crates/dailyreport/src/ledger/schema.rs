//! `SQLite` schema for the generation ledger.

/// One row per generated report.
pub const CREATE_GENERATIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS generations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_path TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    report_date TEXT NOT NULL,
    output_path TEXT NOT NULL,
    generated_at TEXT NOT NULL
)
";

/// Lookup index for the regeneration check.
pub const CREATE_SOURCE_HASH_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_generations_source_hash
    ON generations(source_path, content_hash)
";

/// Index for listing by report date.
pub const CREATE_DATE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_generations_date ON generations(report_date DESC)
";

/// Key-value metadata, holding the schema version.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_GENERATIONS_TABLE,
    CREATE_SOURCE_HASH_INDEX,
    CREATE_DATE_INDEX,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generations_table_columns() {
        for column in [
            "source_path TEXT NOT NULL",
            "content_hash TEXT NOT NULL",
            "report_date TEXT NOT NULL",
            "output_path TEXT NOT NULL",
            "generated_at TEXT NOT NULL",
        ] {
            assert!(CREATE_GENERATIONS_TABLE.contains(column), "{column}");
        }
    }

    #[test]
    fn test_schema_statements_order() {
        assert_eq!(SCHEMA_STATEMENTS.len(), 4);
        assert!(SCHEMA_STATEMENTS[0].contains("generations"));
    }
}
