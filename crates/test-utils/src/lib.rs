// crates/test-utils/src/lib.rs

//! Shared helpers for the nasl-exec integration tests.

pub mod scripts;
pub mod sink;

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Defaults to `nasl_exec=debug,nasl=warn`; set `RUST_LOG` to override.
/// Output only shows up for failing tests unless run with `--nocapture`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("nasl_exec=debug,nasl=warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .without_time()
            .init();
    });
}
