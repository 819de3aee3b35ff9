// src/config/model.rs

use serde::Deserialize;

use crate::exec::multiplex::DEFAULT_CHUNK_SIZE;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [exec]
/// drop_privileges = false
/// chunk_size = 8192
/// search_path = "/usr/local/bin:/usr/bin:/bin"
///
/// [log]
/// level = "info"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub exec: ExecSection,

    #[serde(default)]
    pub log: LogSection,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub exec: ExecSection,
    pub log: LogSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(exec: ExecSection, log: LogSection) -> Self {
        Self { exec, log }
    }
}

/// `[exec]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecSection {
    /// Privileges were already dropped for the whole process; per-call
    /// `drop_privileges_user` requests are ignored.
    #[serde(default)]
    pub drop_privileges: bool,

    /// Size of each read from the child's pipes, in bytes.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Colon-separated search path for command lookup. `None` uses `PATH`.
    #[serde(default)]
    pub search_path: Option<String>,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for ExecSection {
    fn default() -> Self {
        Self {
            drop_privileges: false,
            chunk_size: default_chunk_size(),
            search_path: None,
        }
    }
}

/// `[log]` section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    /// Fallback log level when neither `--log-level` nor `NASL_EXEC_LOG`
    /// is given.
    #[serde(default)]
    pub level: Option<String>,
}
