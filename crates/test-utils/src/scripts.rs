#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// A scratch directory holding executable shell scripts, usable as a
/// search path on its own.
pub struct ScriptDir {
    dir: TempDir,
}

impl ScriptDir {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir().context("creating script dir")?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Canonical path of the directory (resolves e.g. `/tmp` symlinks), as
    /// `pwd -P` inside it would print.
    pub fn canonical_path(&self) -> Result<PathBuf> {
        fs::canonicalize(self.dir.path()).context("canonicalizing script dir")
    }

    /// Write `body` as an executable `/bin/sh` script called `name`.
    pub fn script(&self, name: &str, body: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n"))
            .with_context(|| format!("writing script {:?}", path))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("chmod script {:?}", path))?;
        Ok(path)
    }
}
