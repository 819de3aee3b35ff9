// src/path/mod.rs

//! Search-path lookup of executables.
//!
//! [`PathProbe`] answers "is this command runnable by name?" without running
//! anything. It uses the `which` crate, i.e. the same lookup convention as an
//! interactive shell: names containing a `/` are checked as paths, bare names
//! are searched in each `PATH` entry for an executable file.
//!
//! The launcher uses the same probe when it has to relocate the working
//! directory next to a command given by bare name.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::errors::ExecError;

#[derive(Debug, Clone, Default)]
pub struct PathProbe {
    /// Explicit search path. `None` uses the process `PATH`.
    search_path: Option<OsString>,
}

impl PathProbe {
    /// Probe against the process `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe against an explicit, colon-separated search path.
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }

    pub fn search_path(&self) -> Option<&OsString> {
        self.search_path.as_ref()
    }

    /// Full path of `name`, or `None` if it cannot be found.
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }

        let found = match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
                which::which_in(name, Some(paths), cwd)
            }
            None => which::which(name),
        };

        match found {
            Ok(path) => {
                trace!(cmd = name, path = %path.display(), "found in search path");
                Some(path)
            }
            Err(e) => {
                debug!(cmd = name, error = %e, "not found in search path");
                None
            }
        }
    }

    /// Whether `name` resolves through the search path.
    pub fn resolvable(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Like [`find`](Self::find) but with the launcher's error for a miss.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, ExecError> {
        self.find(name)
            .ok_or_else(|| ExecError::Resolution(name.to_string()))
    }
}

/// Whether `cmd` names a file directly rather than a search-path entry.
pub fn is_absolute_command(cmd: &str) -> bool {
    Path::new(cmd).is_absolute()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    use super::*;

    fn write_executable(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn finds_executables_in_explicit_search_path() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_executable(dir.path(), "probe-me");
        let probe = PathProbe::with_search_path(dir.path().as_os_str());

        assert!(probe.resolvable("probe-me"));
        assert_eq!(probe.find("probe-me"), Some(script));
        assert!(!probe.resolvable("definitely-not-here"));
    }

    #[test]
    fn non_executable_files_do_not_count() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("plain"), "data").unwrap();
        let probe = PathProbe::with_search_path(dir.path().as_os_str());
        assert!(!probe.resolvable("plain"));
    }

    #[test]
    fn empty_name_is_never_resolvable() {
        assert!(!PathProbe::new().resolvable(""));
    }

    #[test]
    fn resolve_miss_is_a_resolution_error() {
        let dir = tempfile::tempdir().unwrap();
        let probe = PathProbe::with_search_path(dir.path().as_os_str());
        let err = probe.resolve("ghost").unwrap_err();
        assert!(matches!(err, ExecError::Resolution(name) if name == "ghost"));
    }

    #[test]
    fn absolute_commands_are_detected() {
        assert!(is_absolute_command("/bin/sh"));
        assert!(!is_absolute_command("sh"));
        assert!(!is_absolute_command("./sh"));
    }
}
