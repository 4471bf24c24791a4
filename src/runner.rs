//! Batch runner: the sequential compile loop.
//!
//! Jobs run strictly one at a time in discovery order. Each job:
//! 1. switches the working directory to its source directory (guard-scoped),
//! 2. runs the engine for the configured number of passes, unconditionally,
//! 3. decides success by artifact presence, never by exit codes,
//! 4. relocates the artifact into the mirrored output tree.
//!
//! Per-job failures are converted into outcome records and never abort the
//! run; only preflight (engine resolution, done by the caller) is fatal.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::discovery::discover;
use crate::engine::TexEngine;
use crate::error::Result;
use crate::job::{Job, JobOutcome};
use crate::report::RunReport;
use crate::workdir::WorkdirGuard;

/// TeX byproducts that `clean` removes next to each source.
const BYPRODUCT_EXTS: &[&str] = &["aux", "log", "nav", "out", "snm", "toc", "vrb"];

/// Options governing one batch run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Engine passes per job; repeated passes settle cross-references
    pub passes: u32,
    /// Source extension to discover
    pub source_ext: String,
    /// Artifact extension the engine produces
    pub artifact_ext: String,
    /// Output tree directory name, resolved under the scan root
    pub output_dir: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            passes: 2,
            source_ext: "tex".to_string(),
            artifact_ext: "pdf".to_string(),
            output_dir: "pdf_output".to_string(),
        }
    }
}

impl RunnerConfig {
    /// Set the number of passes per job.
    pub fn with_passes(mut self, passes: u32) -> Self {
        self.passes = passes;
        self
    }

    /// Set the output tree directory name.
    pub fn with_output_dir(mut self, dir: impl Into<String>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

/// Runs a whole batch through a [`TexEngine`].
pub struct BatchRunner<E: TexEngine> {
    engine: Arc<E>,
    config: RunnerConfig,
}

impl<E: TexEngine> BatchRunner<E> {
    /// Create a runner with default options.
    pub fn new(engine: Arc<E>) -> Self {
        Self::with_config(engine, RunnerConfig::default())
    }

    /// Create a runner with explicit options.
    pub fn with_config(engine: Arc<E>, config: RunnerConfig) -> Self {
        Self { engine, config }
    }

    /// Process every source under `root` and return the run report.
    ///
    /// Outcomes are recorded in discovery order; success + failure always
    /// equals the number of discovered sources.
    pub async fn run(&self, root: &Path) -> Result<RunReport> {
        let root = root.canonicalize()?;
        let sources = discover(&root, &self.config.source_ext)?;
        log::info!(
            "discovered {} source(s) under {}",
            sources.len(),
            root.display()
        );

        let output_root = root.join(&self.config.output_dir);
        let mut outcomes = Vec::with_capacity(sources.len());

        for source in &sources {
            let job = Job::from_source(source, &root)?;
            let outcome = self.compile(&job, &output_root).await;
            log::info!(
                "[{}] {}",
                outcome.status.as_str(),
                job.source.display()
            );
            outcomes.push(outcome);
        }

        Ok(RunReport::new(
            root,
            self.engine.description().to_string(),
            self.config.passes,
            outcomes,
        ))
    }

    /// Compile one job. Never returns an error: every fault becomes a
    /// failed outcome so the batch keeps going.
    async fn compile(&self, job: &Job, output_root: &Path) -> JobOutcome {
        match self.compile_inner(job, output_root).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("{}: {}", job.source.display(), e);
                JobOutcome::failed(job.clone())
            }
        }
    }

    async fn compile_inner(&self, job: &Job, output_root: &Path) -> Result<JobOutcome> {
        // Relative \input and asset paths resolve against the job directory.
        let _workdir = WorkdirGuard::change_to(&job.dir)?;

        for pass in 1..=self.config.passes {
            match self.engine.run_pass(&job.source, &job.dir).await {
                Ok(outcome) => {
                    // Non-zero exits are expected noise; the artifact check
                    // below is the only success signal.
                    log::debug!(
                        "{} pass {}/{}: exit {:?}",
                        job.stem,
                        pass,
                        self.config.passes,
                        outcome.exit_code
                    );
                }
                Err(e) => {
                    log::warn!(
                        "{} pass {}/{} could not run: {}",
                        job.stem,
                        pass,
                        self.config.passes,
                        e
                    );
                    return Ok(JobOutcome::failed(job.clone()));
                }
            }
        }

        let produced = job.produced_artifact(&self.config.artifact_ext);
        if !produced.is_file() {
            return Ok(JobOutcome::failed(job.clone()));
        }

        let dest_dir = output_root.join(&job.rel_dir);
        fs::create_dir_all(&dest_dir)?;
        let dest = dest_dir.join(job.artifact_name(&self.config.artifact_ext));
        fs::copy(&produced, &dest)?;

        let digest = digest_file(&dest)?;
        tracing::debug!(deck = %job.stem, dest = %dest.display(), "artifact relocated");

        Ok(JobOutcome::success(job.clone(), dest, digest))
    }
}

/// Remove TeX byproducts next to every discovered source under `root`.
///
/// Returns the number of files removed. The output tree and the run log are
/// untouched.
pub fn clean(root: &Path, source_ext: &str) -> Result<usize> {
    let root = root.canonicalize()?;
    let sources = discover(&root, source_ext)?;

    let mut removed = 0;
    for source in &sources {
        let job = Job::from_source(source, &root)?;
        for ext in BYPRODUCT_EXTS {
            let byproduct = job.dir.join(job.artifact_name(ext));
            if !byproduct.is_file() {
                continue;
            }
            match fs::remove_file(&byproduct) {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("could not remove {}: {}", byproduct.display(), e),
            }
        }
    }

    log::info!("removed {} byproduct file(s) under {}", removed, root.display());
    Ok(removed)
}

fn digest_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
