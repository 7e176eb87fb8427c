//! Error types for dailyreport.
//!
//! This module defines all error types used throughout the dailyreport crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for dailyreport operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the ledger database.
    #[error("failed to open ledger at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// A setting needed by the current operation is not configured.
    #[error("missing required setting: {name}")]
    MissingSetting {
        /// Name of the setting (config key or environment variable).
        name: &'static str,
    },

    // === Workspace Errors ===
    /// The note file to convert does not exist.
    #[error("input not found: {path}")]
    InputNotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// A scratch note with the same name already exists.
    #[error("note already exists: {path}")]
    NoteExists {
        /// Path of the existing note.
        path: PathBuf,
    },

    /// A note or report name that is not a plain file name.
    #[error("invalid file name {name:?}: expected a file inside the workspace directory")]
    InvalidEntryName {
        /// The rejected name.
        name: String,
    },

    /// No daily reports were found for the requested week.
    #[error("no daily reports found for {week}")]
    NoReports {
        /// Human-readable week label, e.g. `2026-W07`.
        week: String,
    },

    /// A date or ISO week argument could not be interpreted.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    // === API Errors ===
    /// The completion API answered with a non-success status.
    #[error("cloud API HTTP {status}: {detail}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, or the transport's description of the failure.
        detail: String,
    },

    /// The request could not be delivered.
    #[error("cloud API request failed: {0}")]
    ApiRequest(String),

    /// The API returned a body that is not JSON.
    #[error("cloud API returned non-JSON response: {snippet}")]
    ApiNonJson {
        /// The first characters of the body.
        snippet: String,
    },

    /// None of the configured response paths resolved.
    #[error("unable to extract model output from response paths: {paths:?}. Last error: {last}")]
    ResponseExtract {
        /// Paths that were tried, in order.
        paths: Vec<String>,
        /// Failure reported for the last path.
        last: String,
    },

    /// A dotted path could not be followed through a JSON value.
    #[error("cannot navigate part={part:?}: {reason}")]
    PathNavigate {
        /// The path segment that failed.
        part: String,
        /// Why it failed.
        reason: String,
    },

    /// The model output was empty once reasoning blocks were removed.
    #[error("cloud API returned empty content after filtering")]
    EmptyOutput,

    /// A request template or header map is not valid JSON.
    #[error("invalid {name}: {message}")]
    Template {
        /// Which setting held the bad JSON.
        name: &'static str,
        /// Parser message.
        message: String,
    },

    // === Git Errors ===
    /// The workspace is not a git repository.
    #[error("not a git repository: {path}")]
    NotARepository {
        /// Directory that was checked.
        path: PathBuf,
    },

    /// A git command exited unsuccessfully.
    #[error("git {command} failed: {stderr}")]
    Git {
        /// The git subcommand and arguments.
        command: String,
        /// Captured standard error.
        stderr: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for dailyreport operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new request failure error.
    #[must_use]
    pub fn api_request(message: impl Into<String>) -> Self {
        Self::ApiRequest(message.into())
    }

    /// Create a template error for the named setting.
    #[must_use]
    pub fn template(name: &'static str, message: impl Into<String>) -> Self {
        Self::Template {
            name,
            message: message.into(),
        }
    }

    /// Create a path navigation error.
    #[must_use]
    pub fn path_navigate(part: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PathNavigate {
            part: part.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error means the input note was missing.
    #[must_use]
    pub fn is_input_not_found(&self) -> bool {
        matches!(self, Self::InputNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::EmptyOutput;
        assert_eq!(
            err.to_string(),
            "cloud API returned empty content after filtering"
        );

        let err = Error::api_request("connection refused");
        assert_eq!(err.to_string(), "cloud API request failed: connection refused");
    }

    #[test]
    fn test_api_error_display() {
        let err = Error::Api {
            status: 401,
            detail: "unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "cloud API HTTP 401: unauthorized");
    }

    #[test]
    fn test_is_input_not_found() {
        let err = Error::InputNotFound {
            path: PathBuf::from("notes/missing.md"),
        };
        assert!(err.is_input_not_found());
        assert!(!Error::EmptyOutput.is_input_not_found());
    }

    #[test]
    fn test_missing_setting_display() {
        let err = Error::MissingSetting {
            name: "REPORT_API_URL",
        };
        assert!(err.to_string().contains("REPORT_API_URL"));
    }

    #[test]
    fn test_response_extract_lists_paths() {
        let err = Error::ResponseExtract {
            paths: vec!["choices.0.text".to_string(), "text".to_string()],
            last: "missing key".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("choices.0.text"));
        assert!(msg.contains("missing key"));
    }

    #[test]
    fn test_template_error_display() {
        let err = Error::template("REPORT_API_EXTRA_HEADERS_JSON", "expected value");
        let msg = err.to_string();
        assert!(msg.contains("REPORT_API_EXTRA_HEADERS_JSON"));
        assert!(msg.contains("expected value"));
    }

    #[test]
    fn test_git_error_display() {
        let err = Error::Git {
            command: "push".to_string(),
            stderr: "rejected".to_string(),
        };
        assert_eq!(err.to_string(), "git push failed: rejected");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }

    #[test]
    fn test_no_reports_display() {
        let err = Error::NoReports {
            week: "2026-W07".to_string(),
        };
        assert_eq!(err.to_string(), "no daily reports found for 2026-W07");
    }
}
