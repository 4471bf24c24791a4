//! Stub engine for tests.
//!
//! Lets the batch runner be exercised without a TeX installation: depending
//! on behavior it drops a fake artifact next to the source, produces
//! nothing, or fails to start at all.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{PassOutcome, TexEngine};
use crate::error::{DeckbuildError, Result};

/// How the stub behaves on each pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubBehavior {
    /// Write `<stem>.pdf` next to the source and exit 0
    Produce,
    /// Exit 0 without producing anything
    Silent,
    /// Return an error, as if the engine binary could not be started
    Fault,
}

/// Test double for [`TexEngine`].
pub struct StubEngine {
    behavior: StubBehavior,
    exit_code: i32,
    /// Stems for which no artifact is produced even in `Produce` mode
    skip_stems: Vec<String>,
    passes: AtomicUsize,
}

impl StubEngine {
    /// Stub that produces an artifact on every pass.
    pub fn succeeding() -> Self {
        Self::with_behavior(StubBehavior::Produce)
    }

    /// Stub that never produces an artifact.
    pub fn failing() -> Self {
        Self::with_behavior(StubBehavior::Silent)
    }

    /// Stub whose invocation faults, as if the binary vanished mid-run.
    pub fn faulting() -> Self {
        Self::with_behavior(StubBehavior::Fault)
    }

    /// Stub with an explicit behavior.
    pub fn with_behavior(behavior: StubBehavior) -> Self {
        Self {
            behavior,
            exit_code: 0,
            skip_stems: Vec::new(),
            passes: AtomicUsize::new(0),
        }
    }

    /// Report this exit code from every pass.
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Produce no artifact for sources with this stem, letting one stub
    /// drive mixed success/failure batches.
    pub fn skipping(mut self, stem: impl Into<String>) -> Self {
        self.skip_stems.push(stem.into());
        self
    }

    /// Number of passes run so far, across all jobs.
    pub fn pass_count(&self) -> usize {
        self.passes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TexEngine for StubEngine {
    async fn run_pass(&self, source: &Path, workdir: &Path) -> Result<PassOutcome> {
        self.passes.fetch_add(1, Ordering::SeqCst);

        if self.behavior == StubBehavior::Fault {
            return Err(DeckbuildError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "stub engine refused to start",
            )));
        }

        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| DeckbuildError::InvalidSource(source.display().to_string()))?;

        let skipped = self.skip_stems.iter().any(|s| s == stem);
        if self.behavior == StubBehavior::Produce && !skipped {
            std::fs::write(
                workdir.join(format!("{}.pdf", stem)),
                b"%PDF-1.5\n% stub artifact\n",
            )?;
        }

        Ok(PassOutcome {
            exit_code: Some(self.exit_code),
            duration: Duration::ZERO,
        })
    }

    fn description(&self) -> &str {
        "stub engine"
    }
}
