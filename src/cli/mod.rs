//! CLI module for deckbuild - command-line interface and subcommands.
//!
//! Provides the main entry point: the default invocation runs a batch
//! build; `list` and `clean` operate on the same discovered deck set.

pub mod commands;

pub use commands::Cli;
