//! Real TeX engine invocation.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;

use super::{PassOutcome, TexEngine};
use crate::error::{DeckbuildError, Result};

/// Engine that shells out to pdflatex (or any drop-in such as xelatex or
/// lualatex, via the configured program path).
///
/// Invocation shape: `<program> -interaction=nonstopmode [-shell-escape]
/// <file-name>`, with the job directory as the child working directory so
/// relative `\input` and asset paths resolve.
pub struct PdflatexEngine {
    program: PathBuf,
    shell_escape: bool,
    description: String,
}

impl PdflatexEngine {
    /// Create an engine around a resolved program path.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let description = program.display().to_string();
        Self {
            program,
            shell_escape: false,
            description,
        }
    }

    /// Enable or disable `-shell-escape`. Off by default; decks that drive
    /// external tools (minted, gnuplot) need it.
    pub fn with_shell_escape(mut self, enabled: bool) -> Self {
        self.shell_escape = enabled;
        self.description = if enabled {
            format!("{} -shell-escape", self.program.display())
        } else {
            self.program.display().to_string()
        };
        self
    }

    /// The resolved program path.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl TexEngine for PdflatexEngine {
    async fn run_pass(&self, source: &Path, workdir: &Path) -> Result<PassOutcome> {
        let file_name = source
            .file_name()
            .ok_or_else(|| DeckbuildError::InvalidSource(source.display().to_string()))?;

        let mut cmd = Command::new(&self.program);
        cmd.arg("-interaction=nonstopmode");
        if self.shell_escape {
            cmd.arg("-shell-escape");
        }
        cmd.arg(file_name);
        cmd.current_dir(workdir);
        // Engine console output is not the success signal; capture it
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let start = Instant::now();
        let output = cmd.output().await?;
        let duration = start.elapsed();

        log::debug!(
            "{} {:?}: exit {:?} in {:.1}s",
            self.program.display(),
            file_name,
            output.status.code(),
            duration.as_secs_f64()
        );

        Ok(PassOutcome {
            exit_code: output.status.code(),
            duration,
        })
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_description_plain() {
        let engine = PdflatexEngine::new("/usr/bin/pdflatex");
        assert_eq!(engine.description(), "/usr/bin/pdflatex");
        assert_eq!(engine.program(), Path::new("/usr/bin/pdflatex"));
    }

    #[test]
    fn test_description_with_shell_escape() {
        let engine = PdflatexEngine::new("/usr/bin/pdflatex").with_shell_escape(true);
        assert_eq!(engine.description(), "/usr/bin/pdflatex -shell-escape");
    }

    #[test]
    fn test_shell_escape_round_trip() {
        let engine = PdflatexEngine::new("/usr/bin/pdflatex")
            .with_shell_escape(true)
            .with_shell_escape(false);
        assert_eq!(engine.description(), "/usr/bin/pdflatex");
    }

    #[tokio::test]
    async fn test_run_pass_reports_exit_code() {
        // `false` takes the engine's place: it ignores its arguments and
        // exits 1, which must surface as a PassOutcome, not an Err.
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("deck.tex"), "").unwrap();

        let engine = PdflatexEngine::new("/bin/false");
        let outcome = engine
            .run_pass(&dir.path().join("deck.tex"), dir.path())
            .await
            .unwrap();

        assert_eq!(outcome.exit_code, Some(1));
    }

    #[tokio::test]
    async fn test_run_pass_spawn_failure_is_err() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("deck.tex"), "").unwrap();

        let engine = PdflatexEngine::new("/no/such/engine");
        let result = engine
            .run_pass(&dir.path().join("deck.tex"), dir.path())
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_run_pass_rejects_sourceless_path() {
        let engine = PdflatexEngine::new("/bin/true");
        let result = engine.run_pass(Path::new("/"), Path::new("/tmp")).await;
        assert!(matches!(result, Err(DeckbuildError::InvalidSource(_))));
    }
}
