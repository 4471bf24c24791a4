//! Batch build integration tests
//!
//! Exercises the full discover/compile/relocate/report flow with the stub
//! engine, so no TeX installation is needed.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use deckbuild::discovery::discover;
use deckbuild::engine::{StubEngine, resolve_program};
use deckbuild::error::Result;
use deckbuild::job::JobStatus;
use deckbuild::report::RunReport;
use deckbuild::runner::{BatchRunner, RunnerConfig, clean};
use tempfile::TempDir;

// The runner switches the process working directory per job; tests in this
// binary run on parallel threads, so cwd-touching tests serialize here.
static CWD_LOCK: Mutex<()> = Mutex::new(());

fn lock_cwd() -> MutexGuard<'static, ()> {
    CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

fn deck(dir: &Path, rel: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, "\\documentclass{beamer}\\begin{document}\\end{document}").unwrap();
}

/// Integration test: successful batch mirrors the source tree under pdf_output
#[tokio::test]
async fn test_batch_build_mirrors_tree() -> Result<()> {
    let _cwd = lock_cwd();
    let temp_dir = TempDir::new()?;
    deck(temp_dir.path(), "intro.tex");
    deck(temp_dir.path(), "2024/spring/lecture1.tex");
    deck(temp_dir.path(), "2024/spring/lecture2.tex");

    let runner = BatchRunner::new(Arc::new(StubEngine::succeeding()));
    let report = runner.run(temp_dir.path()).await?;

    let summary = report.summary();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 0);

    assert!(report.root.join("pdf_output/intro.pdf").is_file());
    assert!(
        report
            .root
            .join("pdf_output/2024/spring/lecture1.pdf")
            .is_file()
    );
    assert!(
        report
            .root
            .join("pdf_output/2024/spring/lecture2.pdf")
            .is_file()
    );

    Ok(())
}

/// Integration test: a deck that never produces a PDF fails without
/// stopping the batch
#[tokio::test]
async fn test_failed_deck_does_not_abort_batch() -> Result<()> {
    let _cwd = lock_cwd();
    let temp_dir = TempDir::new()?;
    deck(temp_dir.path(), "a.tex");
    deck(temp_dir.path(), "b.tex");
    deck(temp_dir.path(), "c.tex");

    let engine = Arc::new(StubEngine::succeeding().skipping("a"));
    let runner = BatchRunner::new(Arc::clone(&engine));
    let report = runner.run(temp_dir.path()).await?;

    let summary = report.summary();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded + summary.failed, summary.total);

    // Every deck got its full pass budget, failure included
    assert_eq!(engine.pass_count(), 6);

    let failed = report.failed_sources();
    assert_eq!(failed, vec![report.root.join("a.tex").as_path()]);

    Ok(())
}

/// Integration test: hidden directories are never picked up
#[tokio::test]
async fn test_hidden_paths_are_skipped() -> Result<()> {
    let _cwd = lock_cwd();
    let temp_dir = TempDir::new()?;
    deck(temp_dir.path(), "a.tex");
    deck(temp_dir.path(), "b.tex");
    deck(temp_dir.path(), ".skip/c.tex");

    let canonical = temp_dir.path().canonicalize()?;
    let sources = discover(&canonical, "tex")?;
    let names: Vec<_> = sources
        .iter()
        .map(|p| p.strip_prefix(&canonical).unwrap().to_path_buf())
        .collect();
    assert_eq!(names, vec![Path::new("a.tex"), Path::new("b.tex")]);

    let runner = BatchRunner::new(Arc::new(StubEngine::succeeding()));
    let report = runner.run(temp_dir.path()).await?;
    assert_eq!(report.summary().total, 2);
    assert!(!report.root.join("pdf_output/.skip").exists());

    Ok(())
}

/// Integration test: empty root still yields a report and a run log
#[tokio::test]
async fn test_empty_root_writes_log() -> Result<()> {
    let _cwd = lock_cwd();
    let temp_dir = TempDir::new()?;

    let runner = BatchRunner::new(Arc::new(StubEngine::succeeding()));
    let report = runner.run(temp_dir.path()).await?;

    let summary = report.summary();
    assert_eq!(summary.total, 0);
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 0);

    let log_path = report.root.join("deckbuild.log");
    report.write_log(&log_path)?;
    let text = fs::read_to_string(&log_path)?;
    assert!(text.contains("total: 0  succeeded: 0  failed: 0"));

    Ok(())
}

/// Integration test: the working directory is restored after the run,
/// success or not
#[tokio::test]
async fn test_working_directory_restored() -> Result<()> {
    let _cwd = lock_cwd();
    let temp_dir = TempDir::new()?;
    deck(temp_dir.path(), "ok.tex");
    deck(temp_dir.path(), "broken.tex");

    let before = std::env::current_dir()?;

    let engine = Arc::new(StubEngine::succeeding().skipping("broken"));
    let runner = BatchRunner::new(engine);
    runner.run(temp_dir.path()).await?;

    assert_eq!(std::env::current_dir()?, before);
    Ok(())
}

/// Integration test: engine resolution failure is fatal before any job
#[test]
fn test_preflight_failure_is_fatal() {
    assert!(resolve_program("definitely-no-such-engine-xyz").is_err());
    assert!(resolve_program("").is_err());
}

/// Integration test: run log carries per-deck lines and is overwritten
#[tokio::test]
async fn test_run_log_contents_and_overwrite() -> Result<()> {
    let _cwd = lock_cwd();
    let temp_dir = TempDir::new()?;
    deck(temp_dir.path(), "good.tex");
    deck(temp_dir.path(), "bad.tex");

    let engine = Arc::new(StubEngine::succeeding().skipping("bad"));
    let runner = BatchRunner::new(engine);
    let report = runner.run(temp_dir.path()).await?;

    let log_path = report.root.join("deckbuild.log");
    report.write_log(&log_path)?;

    let text = fs::read_to_string(&log_path)?;
    assert!(text.contains("engine: stub engine"));
    assert!(text.contains("passes: 2"));
    assert!(text.contains("[ok]   good.tex -> pdf_output/good.pdf sha256="));
    assert!(text.contains("[fail] bad.tex"));
    assert!(text.contains("total: 2  succeeded: 1  failed: 1"));

    // A second, cleaner run replaces the log wholesale
    fs::remove_file(temp_dir.path().join("bad.tex"))?;
    let runner = BatchRunner::new(Arc::new(StubEngine::succeeding()));
    let report = runner.run(temp_dir.path()).await?;
    report.write_log(&log_path)?;

    let text = fs::read_to_string(&log_path)?;
    assert!(!text.contains("[fail]"));
    assert!(text.contains("total: 1  succeeded: 1  failed: 0"));

    Ok(())
}

/// Integration test: outcome order matches discovery order across reruns
#[tokio::test]
async fn test_outcome_order_is_stable() -> Result<()> {
    let _cwd = lock_cwd();
    let temp_dir = TempDir::new()?;
    deck(temp_dir.path(), "z.tex");
    deck(temp_dir.path(), "a/p.tex");
    deck(temp_dir.path(), "m/q.tex");

    let order = |report: &RunReport| -> Vec<String> {
        report
            .outcomes
            .iter()
            .map(|o| o.job.stem.clone())
            .collect()
    };

    let runner = BatchRunner::new(Arc::new(StubEngine::succeeding()));
    let first = runner.run(temp_dir.path()).await?;
    let second = runner.run(temp_dir.path()).await?;

    assert_eq!(order(&first), vec!["p", "q", "z"]);
    assert_eq!(order(&first), order(&second));

    Ok(())
}

/// Integration test: JSON report carries outcomes and derived summary
#[tokio::test]
async fn test_json_report() -> Result<()> {
    let _cwd = lock_cwd();
    let temp_dir = TempDir::new()?;
    deck(temp_dir.path(), "a.tex");

    let runner = BatchRunner::new(Arc::new(StubEngine::succeeding()));
    let report = runner.run(temp_dir.path()).await?;

    let json = report.to_json()?;
    let value: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(value["summary"]["total"], 1);
    assert_eq!(value["summary"]["succeeded"], 1);
    assert_eq!(value["outcomes"][0]["status"], "success");
    assert_eq!(value["passes"], 2);

    Ok(())
}

/// Integration test: clean sweeps byproducts for discovered decks only
#[tokio::test]
async fn test_clean_after_build() -> Result<()> {
    let _cwd = lock_cwd();
    let temp_dir = TempDir::new()?;
    deck(temp_dir.path(), "talks/a.tex");

    let runner = BatchRunner::with_config(
        Arc::new(StubEngine::succeeding()),
        RunnerConfig::default().with_passes(1),
    );
    runner.run(temp_dir.path()).await?;

    // Simulate the byproducts a real engine leaves behind
    for ext in ["aux", "log", "nav", "out", "snm", "toc", "vrb"] {
        fs::write(temp_dir.path().join(format!("talks/a.{}", ext)), "")?;
    }

    let removed = clean(temp_dir.path(), "tex")?;
    assert_eq!(removed, 7);
    assert!(temp_dir.path().join("talks/a.tex").is_file());
    // The relocated artifact is untouched
    assert!(
        temp_dir
            .path()
            .canonicalize()?
            .join("pdf_output/talks/a.pdf")
            .is_file()
    );

    Ok(())
}

/// Integration test: statuses land in the order decks were discovered
#[tokio::test]
async fn test_statuses_in_discovery_order() -> Result<()> {
    let _cwd = lock_cwd();
    let temp_dir = TempDir::new()?;
    deck(temp_dir.path(), "a.tex");
    deck(temp_dir.path(), "b.tex");
    deck(temp_dir.path(), "c.tex");

    let engine = Arc::new(StubEngine::succeeding().skipping("b"));
    let runner = BatchRunner::new(engine);
    let report = runner.run(temp_dir.path()).await?;

    let statuses: Vec<_> = report.outcomes.iter().map(|o| o.status).collect();
    assert_eq!(
        statuses,
        vec![JobStatus::Success, JobStatus::Failed, JobStatus::Success]
    );

    Ok(())
}
