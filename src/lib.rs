//! deckbuild - batch builder for LaTeX slide decks
//!
//! Discovers `.tex` sources under a root directory, compiles each through an
//! external TeX engine with a fixed number of passes, relocates the PDFs
//! into a mirrored `pdf_output/` tree, and records per-deck outcomes in a
//! summary and a persisted run log.

pub mod discovery;
pub mod engine;
pub mod error;
pub mod job;
pub mod report;
pub mod runner;
pub mod workdir;

pub use error::{DeckbuildError, Result};
