// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `nasl-exec`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "nasl-exec",
    version,
    about = "Run a command and capture its combined stdout/stderr, the way scripts' pread() does.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `nasl-exec.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `NASL_EXEC_LOG`, the config file, or `info` is used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Run CMD and write its combined output to stdout.
    Pread {
        /// Run from the directory containing CMD.
        #[arg(long)]
        cd: bool,

        /// Drop privileges to this user before spawning.
        #[arg(long, value_name = "NAME")]
        user: Option<String>,

        /// Command to execute.
        cmd: String,

        /// Argument vector passed verbatim, including argv[0].
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        argv: Vec<String>,
    },

    /// Exit 0 and print 1 if NAME is found in the search path, else print 0
    /// and exit 1.
    FindInPath {
        name: String,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
