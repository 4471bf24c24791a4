//! Run reporting: summary aggregation and the persisted run log.
//!
//! The report owns the ordered outcome records; the summary is derived from
//! them on demand rather than kept as counters. The run log is a plain-text
//! file at the scan root, fully rewritten each run.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::job::JobOutcome;

/// Aggregate counts over one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Everything one run produced, in discovery order.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// Canonical scan root
    pub root: PathBuf,
    /// Resolved engine identity, as it appears in the run log
    pub engine: String,
    /// Passes per job this run used
    pub passes: u32,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// One record per discovered job, discovery order
    pub outcomes: Vec<JobOutcome>,
}

impl RunReport {
    /// Assemble a report. `engine` is the resolved engine description.
    pub fn new(root: PathBuf, engine: String, passes: u32, outcomes: Vec<JobOutcome>) -> Self {
        Self {
            root,
            engine,
            passes,
            started_at: Utc::now(),
            outcomes,
        }
    }

    /// Derive the summary from the outcome records.
    pub fn summary(&self) -> RunSummary {
        let succeeded = self
            .outcomes
            .iter()
            .filter(|o| o.status.is_success())
            .count();
        RunSummary {
            total: self.outcomes.len(),
            succeeded,
            failed: self.outcomes.len() - succeeded,
        }
    }

    /// Source paths of failed jobs, in discovery order.
    pub fn failed_sources(&self) -> Vec<&Path> {
        self.outcomes
            .iter()
            .filter(|o| !o.status.is_success())
            .map(|o| o.job.source.as_path())
            .collect()
    }

    /// Render the report as pretty JSON, with the derived summary attached.
    pub fn to_json(&self) -> Result<String> {
        let mut value = serde_json::to_value(self)?;
        value["summary"] = serde_json::to_value(self.summary())?;
        Ok(serde_json::to_string_pretty(&value)?)
    }

    /// Write the plain-text run log to `path`, replacing any previous log.
    pub fn write_log(&self, path: &Path) -> Result<()> {
        let mut text = String::new();
        let summary = self.summary();

        let _ = writeln!(text, "deckbuild run log");
        let _ = writeln!(text, "timestamp: {}", self.started_at.to_rfc3339());
        let _ = writeln!(text, "root: {}", self.root.display());
        let _ = writeln!(text, "engine: {}", self.engine);
        let _ = writeln!(text, "passes: {}", self.passes);
        let _ = writeln!(text);

        for outcome in &self.outcomes {
            let source = rel(&outcome.job.source, &self.root);
            match (&outcome.artifact, &outcome.digest) {
                (Some(artifact), Some(digest)) => {
                    let _ = writeln!(
                        text,
                        "[{}]   {} -> {} sha256={}",
                        outcome.status.as_str(),
                        source.display(),
                        rel(artifact, &self.root).display(),
                        digest
                    );
                }
                _ => {
                    let _ = writeln!(
                        text,
                        "[{}] {}",
                        outcome.status.as_str(),
                        source.display()
                    );
                }
            }
        }

        let _ = writeln!(text);
        let _ = writeln!(
            text,
            "total: {}  succeeded: {}  failed: {}",
            summary.total, summary.succeeded, summary.failed
        );

        fs::write(path, text)?;
        log::info!("run log written to {}", path.display());
        Ok(())
    }
}

/// Display helper: paths in the log read relative to the scan root.
fn rel<'a>(path: &'a Path, root: &Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}
