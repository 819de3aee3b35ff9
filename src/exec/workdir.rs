// src/exec/workdir.rs

//! Scoped change of the process working directory.
//!
//! The current directory is process-wide state. [`DirectoryContext::enter`]
//! records it (best effort) and switches to the target; the saved directory
//! is put back exactly once, either by [`DirectoryContext::restore`] or, on
//! early exits, by `Drop`.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::ExecError;

#[derive(Debug)]
pub struct DirectoryContext {
    saved: Option<PathBuf>,
    target: PathBuf,
    restored: bool,
}

/// Outcome of [`DirectoryContext::enter`] besides the context itself.
#[derive(Debug)]
pub struct EnterReport {
    /// Set when the current directory could not be read. Nothing will be
    /// restored in that case.
    pub save_error: Option<io::Error>,
}

impl DirectoryContext {
    /// Switch into `target`.
    ///
    /// Failing to read the current directory is tolerated (reported in
    /// [`EnterReport`]); failing to change into `target` is an error and
    /// leaves the working directory untouched.
    pub fn enter(target: &Path) -> Result<(Self, EnterReport), ExecError> {
        let (saved, save_error) = match std::env::current_dir() {
            Ok(dir) => (Some(dir), None),
            Err(e) => {
                warn!(error = %e, "getcwd failed; working directory will not be restored");
                (None, Some(e))
            }
        };

        std::env::set_current_dir(target).map_err(|source| ExecError::Directory {
            dir: target.to_path_buf(),
            source,
        })?;
        debug!(dir = %target.display(), "changed working directory");

        Ok((
            Self {
                saved,
                target: target.to_path_buf(),
                restored: false,
            },
            EnterReport { save_error },
        ))
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn saved(&self) -> Option<&Path> {
        self.saved.as_deref()
    }

    /// Go back to the saved directory. The error names the directory that
    /// could not be re-entered.
    pub fn restore(mut self) -> Result<(), (PathBuf, io::Error)> {
        self.restore_inner()
    }

    fn restore_inner(&mut self) -> Result<(), (PathBuf, io::Error)> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        let Some(saved) = self.saved.as_ref() else {
            return Ok(());
        };
        std::env::set_current_dir(saved).map_err(|e| (saved.clone(), e))?;
        debug!(dir = %saved.display(), "restored working directory");
        Ok(())
    }
}

impl Drop for DirectoryContext {
    fn drop(&mut self) {
        if let Err((dir, e)) = self.restore_inner() {
            warn!(dir = %dir.display(), error = %e, "failed to restore working directory");
        }
    }
}

/// Directory a command lives in: everything before the last `/`, unless
/// that would leave nothing (a command directly under `/` stays `/`).
pub fn containing_dir(resolved: &Path) -> PathBuf {
    match resolved.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("/"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containing_dir_of_absolute_paths() {
        assert_eq!(containing_dir(Path::new("/usr/bin/nmap")), PathBuf::from("/usr/bin"));
        assert_eq!(containing_dir(Path::new("/nmap")), PathBuf::from("/"));
        assert_eq!(containing_dir(Path::new("/")), PathBuf::from("/"));
    }
}
