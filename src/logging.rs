// src/logging.rs

//! Logging setup for the `nasl-exec` binary.
//!
//! The filter is chosen from, in order:
//! 1. `--log-level` on the command line
//! 2. `NASL_EXEC_LOG`, either a bare level (`debug`) or full `EnvFilter`
//!    directives (`nasl_exec::exec=trace,nasl=warn`)
//! 3. `[log] level` in the config file
//! 4. `info`
//!
//! Everything goes to stderr. Stdout carries captured child output and has
//! to stay byte-exact.

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "NASL_EXEC_LOG";

/// Install the global subscriber. Call once, early in `main`.
pub fn init_logging(cli_level: Option<LogLevel>, config_level: Option<&str>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let filter = select_filter(cli_level, env_value.as_deref(), config_level)?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("installing tracing subscriber")
}

fn select_filter(
    cli_level: Option<LogLevel>,
    env_value: Option<&str>,
    config_level: Option<&str>,
) -> Result<EnvFilter> {
    if let Some(lvl) = cli_level {
        return Ok(EnvFilter::new(Level::from(lvl).as_str()));
    }
    if let Some(raw) = env_value.map(str::trim).filter(|s| !s.is_empty()) {
        return match parse_level_str(raw) {
            Some(level) => Ok(EnvFilter::new(level.as_str())),
            None => EnvFilter::try_new(raw)
                .with_context(|| format!("invalid {LOG_ENV_VAR} value {raw:?}")),
        };
    }
    let level = config_level
        .and_then(parse_level_str)
        .unwrap_or(Level::INFO);
    Ok(EnvFilter::new(level.as_str()))
}

impl From<LogLevel> for Level {
    fn from(lvl: LogLevel) -> Self {
        match lvl {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Bare level name, case-insensitive. `warning` is accepted for `warn`.
pub(crate) fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim().to_ascii_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
