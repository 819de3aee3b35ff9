// src/sink.rs

//! Error/warning sink seen by the invoking script.
//!
//! Every non-fatal anomaly and every failure of a builtin is reported here
//! once, as a formatted message. The interpreter owns the real sink; the
//! default [`TracingSink`] forwards to `tracing` under the `nasl` target.

use std::fmt::Debug;

use tracing::{error, warn};

pub trait ErrorSink: Send + Sync + Debug {
    /// A failure visible to the script.
    fn error(&self, msg: &str);

    /// A non-fatal anomaly; execution continues.
    fn warning(&self, msg: &str);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn error(&self, msg: &str) {
        error!(target: "nasl", "{}", msg.trim_end());
    }

    fn warning(&self, msg: &str) {
        warn!(target: "nasl", "{}", msg.trim_end());
    }
}
