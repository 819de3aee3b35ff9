// src/builtins/mod.rs

//! The "unsafe" builtins exposed to scripts.
//!
//! Each builtin takes the call's [`CallArgs`] and returns
//! `Option<NaslValue>`: `None` means failure, and the reason has already
//! been reported to the [`ErrorSink`]. Nothing here panics or propagates
//! errors upward; the script decides what to do with a missing result.
//!
//! - [`process`]: `pread`, `find_in_path`
//! - [`files`]: whole-file helpers (`fread`, `fwrite`, `unlink`, ...)
//! - [`handles`]: handle-based file I/O (`file_open`, `file_read`, ...)

pub mod context;
pub mod files;
pub mod handles;
pub mod process;
pub mod value;

use std::sync::Arc;

use tracing::trace;

pub use context::CallArgs;
pub use handles::HandleTable;
pub use value::{NaslArray, NaslValue};

use crate::exec::Launcher;
use crate::sink::ErrorSink;

/// Signature shared by all builtins.
pub type BuiltinFn = fn(&mut UnsafeBuiltins, &CallArgs) -> Option<NaslValue>;

const BUILTINS: &[(&str, BuiltinFn)] = &[
    ("pread", process::pread),
    ("find_in_path", process::find_in_path),
    ("fread", files::fread),
    ("fwrite", files::fwrite),
    ("unlink", files::unlink),
    ("get_tmp_dir", files::get_tmp_dir),
    ("file_stat", files::file_stat),
    ("file_open", handles::file_open),
    ("file_close", handles::file_close),
    ("file_read", handles::file_read),
    ("file_write", handles::file_write),
    ("file_seek", handles::file_seek),
];

/// Look up a builtin by name.
pub fn lookup(name: &str) -> Option<BuiltinFn> {
    BUILTINS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, f)| *f)
}

/// Names of all builtins, in registration order.
pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|(n, _)| *n)
}

/// State shared by the builtins of one interpreter context.
#[derive(Debug)]
pub struct UnsafeBuiltins {
    launcher: Launcher,
    handles: HandleTable,
}

impl Default for UnsafeBuiltins {
    fn default() -> Self {
        Self::new(Launcher::new())
    }
}

impl UnsafeBuiltins {
    /// Builtins reporting through the launcher's sink.
    pub fn new(launcher: Launcher) -> Self {
        Self {
            launcher,
            handles: HandleTable::default(),
        }
    }

    pub fn launcher(&self) -> &Launcher {
        &self.launcher
    }

    pub fn handles(&self) -> &HandleTable {
        &self.handles
    }

    pub(crate) fn handles_mut(&mut self) -> &mut HandleTable {
        &mut self.handles
    }

    pub fn sink(&self) -> &Arc<dyn ErrorSink> {
        self.launcher.sink()
    }

    /// Report a failure to the script.
    pub(crate) fn error(&self, msg: impl AsRef<str>) {
        self.sink().error(msg.as_ref());
    }

    /// Dispatch `name` with `args`. Unknown names are reported and fail.
    pub fn call(&mut self, name: &str, args: &CallArgs) -> Option<NaslValue> {
        let Some(f) = lookup(name) else {
            self.error(format!("{name}: unknown builtin"));
            return None;
        };
        trace!(builtin = name, "calling builtin");
        f(self, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_is_registered_once() {
        let all: Vec<_> = names().collect();
        assert_eq!(all.len(), 12);
        for name in &all {
            assert_eq!(all.iter().filter(|n| *n == name).count(), 1, "{name}");
            assert!(lookup(name).is_some());
        }
        assert!(lookup("exec").is_none());
    }
}
