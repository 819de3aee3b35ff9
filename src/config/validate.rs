// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{NaslExecError, Result};
use crate::logging::parse_level_str;

/// Largest accepted `[exec].chunk_size`.
pub const MAX_CHUNK_SIZE: usize = 1024 * 1024;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = NaslExecError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.exec, raw.log))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_exec(cfg)?;
    validate_log(cfg)?;
    Ok(())
}

fn validate_exec(cfg: &RawConfigFile) -> Result<()> {
    let chunk = cfg.exec.chunk_size;
    if chunk == 0 || chunk > MAX_CHUNK_SIZE {
        return Err(NaslExecError::ConfigError(format!(
            "[exec].chunk_size must be in 1..={MAX_CHUNK_SIZE} (got {chunk})"
        )));
    }

    if let Some(path) = &cfg.exec.search_path {
        if path.trim().is_empty() {
            return Err(NaslExecError::ConfigError(
                "[exec].search_path must not be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_log(cfg: &RawConfigFile) -> Result<()> {
    if let Some(level) = &cfg.log.level {
        if parse_level_str(level).is_none() {
            return Err(NaslExecError::ConfigError(format!(
                "[log].level must be one of error, warn, info, debug, trace (got {level:?})"
            )));
        }
    }
    Ok(())
}
