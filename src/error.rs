//! Error types for deckbuild
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in deckbuild
#[derive(Debug, Error)]
pub enum DeckbuildError {
    /// The TeX engine executable could not be resolved on PATH
    #[error("TeX engine not found: {0}")]
    EngineNotFound(String),

    /// A discovered source path could not be turned into a job
    #[error("Invalid source path: {0}")]
    InvalidSource(String),

    /// Source discovery failed
    #[error("Discovery error: {0}")]
    Discovery(String),

    /// Malformed glob pattern
    #[error("Pattern error: {0}")]
    Pattern(#[from] glob::PatternError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for deckbuild operations
pub type Result<T> = std::result::Result<T, DeckbuildError>;
