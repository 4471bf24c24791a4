use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

use deckbuild::discovery;
use deckbuild::engine::{self, PdflatexEngine, TexEngine};
use deckbuild::report::RunReport;
use deckbuild::runner::{self, BatchRunner, RunnerConfig};

fn setup_logging() -> Result<()> {
    // Diagnostic log, separate from the per-run build log at the scan root
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("deckbuild")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("deckbuild.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        None => run_build(cli, config).await,
        Some(Commands::List) => run_list(cli, config),
        Some(Commands::Clean) => run_clean(cli, config),
    }
}

/// Root directory a command operates on: --root, or the current directory.
fn scan_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.root {
        Some(root) => Ok(root.clone()),
        None => std::env::current_dir().context("Failed to resolve current directory"),
    }
}

async fn run_build(cli: &Cli, config: &Config) -> Result<()> {
    let root = scan_root(cli)?;
    let program = cli.engine.as_deref().unwrap_or(&config.engine.program);

    // Preflight: resolve the engine before any job is attempted
    let resolved = engine::resolve_program(program)
        .context("Preflight failed: install the TeX engine or point --engine at it")?;
    info!("Using engine at {}", resolved.display());

    let shell_escape = cli.shell_escape || config.engine.shell_escape;
    let tex = Arc::new(PdflatexEngine::new(&resolved).with_shell_escape(shell_escape));

    if cli.is_verbose() {
        println!("{} {}", "Engine:".cyan(), tex.description());
        println!("{} {}", "Root:".cyan(), root.display());
    }

    let runner_config = RunnerConfig {
        passes: cli.passes.unwrap_or(config.build.passes),
        source_ext: config.build.source_ext.clone(),
        artifact_ext: config.output.artifact_ext.clone(),
        output_dir: cli
            .output_dir
            .clone()
            .unwrap_or_else(|| config.output.dir.clone()),
    };

    let batch = BatchRunner::with_config(tex, runner_config);
    let report = batch.run(&root).await.context("Batch run failed")?;

    let log_path = report.root.join(&config.output.run_log);
    report
        .write_log(&log_path)
        .context("Failed to write run log")?;

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        print_summary(&report, &log_path);
    }

    if report.summary().failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn print_summary(report: &RunReport, log_path: &Path) {
    let summary = report.summary();

    if summary.total == 0 {
        println!("{}", "No decks found".yellow());
    } else {
        let banner = if summary.failed == 0 {
            "Build complete.".green()
        } else {
            "Build finished with failures.".red()
        };
        println!(
            "{} total: {}  succeeded: {}  failed: {}",
            banner, summary.total, summary.succeeded, summary.failed
        );
        if summary.failed > 0 {
            println!("{}", "Failed decks:".red());
            for source in report.failed_sources() {
                println!("  {}", source.display());
            }
        }
    }

    println!("Run log: {}", log_path.display());
}

fn run_list(cli: &Cli, config: &Config) -> Result<()> {
    let root = scan_root(cli)?;
    let root = root
        .canonicalize()
        .context(format!("Cannot access root {}", root.display()))?;

    let sources = discovery::discover(&root, &config.build.source_ext)?;
    if sources.is_empty() {
        println!("{}", "No decks found".yellow());
        return Ok(());
    }

    for source in &sources {
        let rel = source.strip_prefix(&root).unwrap_or(source);
        println!("{}", rel.display());
    }
    println!("{} {} deck(s)", "Total:".cyan(), sources.len());
    Ok(())
}

fn run_clean(cli: &Cli, config: &Config) -> Result<()> {
    let root = scan_root(cli)?;
    let removed = runner::clean(&root, &config.build.source_ext)?;
    println!("{} {} byproduct file(s) removed", "Clean:".green(), removed);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
