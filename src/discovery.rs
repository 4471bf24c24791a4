//! Source discovery.
//!
//! Recursively finds source documents under a root directory. Hidden path
//! components (leading dot) are excluded everywhere under the root, files
//! and directories alike. The result is absolute paths in lexicographic
//! order, so repeated scans of an unchanged tree are identical.

use std::path::{Path, PathBuf};

use glob::MatchOptions;

use crate::error::{DeckbuildError, Result};

/// Discover all `*.{ext}` files under `root`.
///
/// An empty result is not an error; a run over zero sources still produces
/// a summary and a run log.
pub fn discover(root: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let root = root.canonicalize()?;
    if !root.is_dir() {
        return Err(DeckbuildError::Discovery(format!(
            "not a directory: {}",
            root.display()
        )));
    }

    let pattern = root.join(format!("**/*.{}", ext));
    let pattern = pattern
        .to_str()
        .ok_or_else(|| DeckbuildError::Discovery(format!("non-UTF-8 root: {}", root.display())))?;

    // require_literal_leading_dot keeps `**` and `*` from descending into
    // or matching hidden entries.
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };

    let mut sources: Vec<PathBuf> = glob::glob_with(pattern, options)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("skipping unreadable path during discovery: {}", e);
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();

    sources.sort();

    tracing::debug!(root = %root.display(), count = sources.len(), "discovery complete");
    Ok(sources)
}
