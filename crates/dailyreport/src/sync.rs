//! Git synchronization of the workspace.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Commit message used when none is given.
pub const DEFAULT_SYNC_MESSAGE: &str = "chore: sync updates";

/// Outcome of [`GitSync::sync`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Git commands that ran successfully, in order.
    pub steps: Vec<String>,
    /// Whether a commit was created.
    pub committed: bool,
}

/// Runs git commands in a workspace repository.
#[derive(Debug, Clone)]
pub struct GitSync {
    root: PathBuf,
}

impl GitSync {
    /// Open the repository at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotARepository`] if `root` has no `.git` directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.join(".git").exists() {
            return Err(Error::NotARepository { path: root });
        }
        Ok(Self { root })
    }

    /// Repository root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run `git <args>` and return its standard output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Git`] if git exits unsuccessfully, or an I/O error
    /// if it cannot be started.
    pub fn run(&self, args: &[&str]) -> Result<String> {
        let command = args.join(" ");
        debug!("git {command}");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(Error::Git {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    /// Stage everything, commit if anything changed, then pull and push.
    ///
    /// # Errors
    ///
    /// Stops at the first failing command with [`Error::Git`].
    pub fn sync(&self, message: &str) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        self.step(&mut report, &["add", "."])?;

        let status = self.step(&mut report, &["status", "--porcelain"])?;
        if status.trim().is_empty() {
            info!("No changes to commit");
        } else {
            self.step(&mut report, &["commit", "-m", message])?;
            report.committed = true;
        }

        self.step(&mut report, &["pull", "--rebase"])?;
        self.step(&mut report, &["push"])?;

        info!(steps = report.steps.len(), "Workspace synchronized");
        Ok(report)
    }

    fn step(&self, report: &mut SyncReport, args: &[&str]) -> Result<String> {
        let out = self.run(args)?;
        report.steps.push(args.join(" "));
        Ok(out)
    }
}
