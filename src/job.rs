//! Job and outcome types.
//!
//! A [`Job`] is one discovered source document; a [`JobOutcome`] is the
//! immutable record of what happened to it. Outcomes are accumulated in
//! discovery order and reduced to a summary at the end of a run.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{DeckbuildError, Result};

/// One discovered source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    /// Absolute path to the source file
    pub source: PathBuf,
    /// Absolute path to the containing directory
    pub dir: PathBuf,
    /// Containing directory relative to the scan root (empty for root-level)
    pub rel_dir: PathBuf,
    /// File name minus extension
    pub stem: String,
}

impl Job {
    /// Build a job from an absolute source path under `root`.
    pub fn from_source(source: &Path, root: &Path) -> Result<Self> {
        let dir = source
            .parent()
            .ok_or_else(|| DeckbuildError::InvalidSource(source.display().to_string()))?
            .to_path_buf();

        let rel_dir = dir
            .strip_prefix(root)
            .map_err(|_| DeckbuildError::InvalidSource(source.display().to_string()))?
            .to_path_buf();

        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| DeckbuildError::InvalidSource(source.display().to_string()))?
            .to_string();

        Ok(Self {
            source: source.to_path_buf(),
            dir,
            rel_dir,
            stem,
        })
    }

    /// File name of the artifact this job is expected to produce.
    pub fn artifact_name(&self, ext: &str) -> String {
        format!("{}.{}", self.stem, ext)
    }

    /// Where the engine drops the artifact: next to the source.
    pub fn produced_artifact(&self, ext: &str) -> PathBuf {
        self.dir.join(self.artifact_name(ext))
    }
}

/// Status of a processed job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// The expected artifact existed after all passes
    Success,
    /// No artifact, or the engine invocation faulted
    Failed,
}

impl JobStatus {
    /// Check whether this status is a success
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Success)
    }

    /// Short label used in the run log
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Success => "ok",
            JobStatus::Failed => "fail",
        }
    }
}

/// Immutable outcome record for one job.
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    /// The job this outcome belongs to
    pub job: Job,
    /// Final status after all passes
    pub status: JobStatus,
    /// Destination path under the output tree, when successful
    pub artifact: Option<PathBuf>,
    /// SHA-256 of the relocated artifact, when successful
    pub digest: Option<String>,
}

impl JobOutcome {
    /// Record a success with the relocated artifact and its digest.
    pub fn success(job: Job, artifact: PathBuf, digest: String) -> Self {
        Self {
            job,
            status: JobStatus::Success,
            artifact: Some(artifact),
            digest: Some(digest),
        }
    }

    /// Record a failure. Failed jobs carry no artifact.
    pub fn failed(job: Job) -> Self {
        Self {
            job,
            status: JobStatus::Failed,
            artifact: None,
            digest: None,
        }
    }
}
