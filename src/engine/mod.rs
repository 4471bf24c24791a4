//! TeX engine abstraction.
//!
//! The external compiler is modeled as a single capability: given a source
//! path and a working directory, run one pass and report the exit status.
//! [`PdflatexEngine`] shells out to the real tool; [`StubEngine`] stands in
//! for it in tests.

pub mod pdflatex;
pub mod stub;

pub use pdflatex::PdflatexEngine;
pub use stub::{StubBehavior, StubEngine};

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{DeckbuildError, Result};

/// What a single engine pass reported.
///
/// Exit status is recorded for logging only; the engine routinely exits
/// non-zero on benign warnings while still emitting a usable artifact.
#[derive(Debug, Clone)]
pub struct PassOutcome {
    /// Exit code, `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    /// Wall-clock duration of the pass
    pub duration: Duration,
}

/// Trait for TeX engines that compile one source document per pass.
#[async_trait]
pub trait TexEngine: Send + Sync {
    /// Run one pass against `source` with `workdir` as the child process
    /// working directory.
    ///
    /// Returns `Err` only when the invocation itself cannot run (spawn
    /// failure, IO fault); a non-zero exit is a normal [`PassOutcome`].
    async fn run_pass(&self, source: &Path, workdir: &Path) -> Result<PassOutcome>;

    /// Human-readable identity for the run log.
    fn description(&self) -> &str {
        "tex engine"
    }
}

/// Resolve an engine program name to an absolute executable path.
///
/// A name containing a path separator is checked as-is; a bare name is
/// searched on PATH. This is the preflight gate: resolution failure aborts
/// the run before any job is attempted.
pub fn resolve_program(program: &str) -> Result<PathBuf> {
    if program.is_empty() {
        return Err(DeckbuildError::EngineNotFound("<empty>".to_string()));
    }

    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        if candidate.is_file() {
            return Ok(candidate.canonicalize()?);
        }
        return Err(DeckbuildError::EngineNotFound(program.to_string()));
    }

    let path_var = env::var_os("PATH")
        .ok_or_else(|| DeckbuildError::EngineNotFound(program.to_string()))?;

    for dir in env::split_paths(&path_var) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        let full = dir.join(program);
        if full.is_file() {
            return Ok(full);
        }
    }

    Err(DeckbuildError::EngineNotFound(program.to_string()))
}
