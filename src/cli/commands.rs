//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - (default): build every deck under the root
//! - list: show the decks a build would process
//! - clean: remove TeX byproducts next to each deck

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// deckbuild - batch LaTeX slide-deck builder
#[derive(Parser, Debug)]
#[command(name = "deckbuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Root directory to scan (default: current directory)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// TeX engine program (default from config, typically pdflatex)
    #[arg(short, long, global = true)]
    pub engine: Option<String>,

    /// Engine passes per deck
    #[arg(long)]
    pub passes: Option<u32>,

    /// Pass -shell-escape to the engine
    #[arg(long)]
    pub shell_escape: bool,

    /// Output tree directory name
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Print the build summary as JSON instead of the colored report
    #[arg(long)]
    pub json: bool,

    /// Subcommand to execute (default: build)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the decks a build would process, without compiling
    List,

    /// Remove TeX byproducts (aux, log, nav, out, snm, toc, vrb)
    Clean,
}
