#![allow(dead_code)]

use std::sync::Arc;

use nasl_exec::exec::{ExecutionGuard, Launcher};
use nasl_exec::path::PathProbe;

pub use nasl_exec_test_utils::init_tracing;
pub use nasl_exec_test_utils::scripts::ScriptDir;
pub use nasl_exec_test_utils::sink::{RecordingSink, Report};

/// Launcher with its own guard (so parallel tests don't collide) reporting
/// into `sink`.
pub fn launcher_with(sink: &RecordingSink) -> Launcher {
    Launcher::new()
        .with_guard(ExecutionGuard::new())
        .with_sink(Arc::new(sink.clone()))
}

/// Same, but commands are looked up only in `scripts`.
pub fn launcher_in(sink: &RecordingSink, scripts: &ScriptDir) -> Launcher {
    launcher_with(sink).with_probe(PathProbe::with_search_path(scripts.path().as_os_str()))
}
