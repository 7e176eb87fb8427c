//! Daily report generation.
//!
//! Ties the pieces together: read a scratch note, consult the ledger, call
//! the completion API, enforce the section layout and write the report.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::api::{CompletionClient, HttpTransport, Transport};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::ledger::{Generation, Ledger};
use crate::note::{content_hash, SourceType};
use crate::report::{build_user_prompt, ensure_minimum_sections, DEFAULT_SYSTEM_PROMPT};
use crate::workspace::{ensure_dir, Workspace};

/// What to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Note file to read.
    pub input: PathBuf,
    /// Report destination; defaults to the workspace daily report path.
    pub output: Option<PathBuf>,
    /// Report date; defaults to today.
    pub date: Option<NaiveDate>,
    /// Where the notes came from.
    pub source_type: SourceType,
    /// Identifier of the source (commit hash, issue number, ...).
    pub source_id: String,
    /// Regenerate even when the ledger says the report is current.
    pub force: bool,
}

impl GenerateRequest {
    /// A manual-source request for `input` with every other field defaulted.
    #[must_use]
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            date: None,
            source_type: SourceType::Manual,
            source_id: "local".to_string(),
            force: false,
        }
    }

    /// Fail unless the input note exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputNotFound`] if `input` is not a file.
    pub fn ensure_input(&self) -> Result<()> {
        if self.input.is_file() {
            Ok(())
        } else {
            Err(Error::InputNotFound {
                path: self.input.clone(),
            })
        }
    }
}

/// Result of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// A new report was written.
    Generated {
        /// Where the report was written.
        output: PathBuf,
        /// Bytes written.
        bytes: usize,
    },
    /// The notes are unchanged and the report is still on disk.
    Skipped {
        /// The existing report.
        output: PathBuf,
    },
}

impl GenerateOutcome {
    /// Path of the report, generated or not.
    #[must_use]
    pub fn output(&self) -> &Path {
        match self {
            Self::Generated { output, .. } | Self::Skipped { output } => output,
        }
    }
}

/// Generates daily reports from scratch notes.
#[derive(Debug)]
pub struct ReportGenerator<T: Transport> {
    client: CompletionClient<T>,
    ledger: Ledger,
    workspace: Workspace,
    system_prompt: Option<String>,
}

impl<T: Transport> ReportGenerator<T> {
    /// Create a generator.
    #[must_use]
    pub fn new(client: CompletionClient<T>, ledger: Ledger, workspace: Workspace) -> Self {
        Self {
            client,
            ledger,
            workspace,
            system_prompt: None,
        }
    }

    /// Replace the built-in system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt.filter(|p| !p.trim().is_empty());
        self
    }

    /// The generation ledger.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Generate the report described by `request`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputNotFound`] if the note does not exist, any
    /// client error from the completion API, or an I/O or ledger error.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateOutcome> {
        request.ensure_input()?;
        let source = std::fs::canonicalize(&request.input)?;
        let raw = std::fs::read_to_string(&source)?;

        let date = request.date.unwrap_or_else(|| Local::now().date_naive());
        let output = request
            .output
            .clone()
            .unwrap_or_else(|| self.workspace.daily_report_path(date));

        let hash = content_hash(&raw);
        if !request.force && self.ledger.is_current(&source, &hash, &output)? {
            info!("Notes unchanged, keeping {}", output.display());
            return Ok(GenerateOutcome::Skipped { output });
        }

        let system_prompt = self
            .system_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_PROMPT);
        let user_prompt =
            build_user_prompt(&raw, request.source_type, &request.source_id, date);
        debug!(
            source = %source.display(),
            prompt_chars = user_prompt.len(),
            "Generating daily report"
        );

        let answer = self.client.complete(&user_prompt, system_prompt).await?;
        let mut report = ensure_minimum_sections(&answer, date);
        if !report.ends_with('\n') {
            report.push('\n');
        }

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_dir(parent)?;
            }
        }
        std::fs::write(&output, &report)?;

        self.ledger
            .record(&Generation::new(&source, hash, date, &output))?;
        info!("Wrote daily report {}", output.display());

        Ok(GenerateOutcome::Generated {
            output,
            bytes: report.len(),
        })
    }
}

/// Generate a report with the HTTP client and on-disk ledger described by
/// `config`.
///
/// The input note is checked before the API settings or the ledger are
/// touched.
///
/// # Errors
///
/// Returns [`Error::InputNotFound`] for a missing note, configuration errors
/// from [`CompletionClient::from_config`], and anything
/// [`ReportGenerator::generate`] returns.
pub async fn generate_report(
    config: &Config,
    request: &GenerateRequest,
) -> Result<GenerateOutcome> {
    request.ensure_input()?;
    let client = CompletionClient::<HttpTransport>::from_config(config)?;
    let ledger = Ledger::open(config.ledger_path())?;
    ReportGenerator::new(client, ledger, Workspace::from_config(config))
        .with_system_prompt(config.generation.system_prompt.clone())
        .generate(request)
        .await
}
