// src/errors.rs

//! Crate-wide error types.
//!
//! [`ExecError`] is the taxonomy of the execution core: every way a single
//! launch can fail. [`NaslExecError`] wraps it together with the ambient
//! failures (config, I/O) for the binary and the config loader.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single launch (or path query).
///
/// Directory restore failures are not listed here: they go to the
/// [`ErrorSink`](crate::sink::ErrorSink) and never change the outcome of a
/// call that already captured its output.
#[derive(Error, Debug)]
pub enum ExecError {
    /// Missing or malformed input, raised before any side effect.
    #[error("{0}")]
    Validation(String),

    /// A previous execution still holds the guard.
    #[error("pread is not reentrant (pid {pid:?} still tracked)")]
    Reentrancy { pid: Option<u32> },

    /// The command could not be found while relocating the working directory.
    #[error("'{0}' not found in PATH")]
    Resolution(String),

    /// The working directory could not be changed to the command's directory.
    #[error("could not chdir to {}: {source}", dir.display())]
    Directory {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The privilege-drop collaborator refused.
    #[error("drop_privileges: {0}")]
    PrivilegeDrop(String),

    /// The OS failed to create the child process.
    #[error("failed to spawn '{cmd}': {source}")]
    Spawn {
        cmd: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading the child's streams failed for a reason other than interruption.
    ///
    /// `partial` is the number of bytes accumulated before the failure; the
    /// bytes themselves are discarded.
    #[error("reading child output failed after {partial} bytes: {source}")]
    Capture {
        partial: usize,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum NaslExecError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, NaslExecError>;
