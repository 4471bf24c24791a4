//! Scoped working-directory changes.
//!
//! The TeX engine resolves `\input` and asset paths against the process
//! working directory, so each job runs with the working directory switched
//! to its source directory. [`WorkdirGuard`] restores the previous directory
//! when dropped, including during unwinding.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// RAII guard over the process working directory.
///
/// The working directory is process-wide state; jobs run strictly one at a
/// time, so a single live guard is the invariant.
#[derive(Debug)]
pub struct WorkdirGuard {
    previous: PathBuf,
}

impl WorkdirGuard {
    /// Switch the process working directory to `dir`, remembering the
    /// current one. Fails without switching if `dir` cannot be entered.
    pub fn change_to(dir: &Path) -> Result<Self> {
        let previous = env::current_dir()?;
        env::set_current_dir(dir)?;
        log::debug!(
            "workdir: {} -> {}",
            previous.display(),
            dir.display()
        );
        Ok(Self { previous })
    }

    /// The directory that will be restored on drop.
    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for WorkdirGuard {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.previous) {
            log::warn!(
                "failed to restore working directory to {}: {}",
                self.previous.display(),
                e
            );
        }
    }
}
