use std::sync::{Arc, Mutex};

use nasl_exec::sink::ErrorSink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Error(String),
    Warning(String),
}

/// An `ErrorSink` that remembers everything reported to it.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    reports: Arc<Mutex<Vec<Report>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.reports()
            .into_iter()
            .filter_map(|r| match r {
                Report::Error(msg) => Some(msg),
                Report::Warning(_) => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.reports()
            .into_iter()
            .filter_map(|r| match r {
                Report::Warning(msg) => Some(msg),
                Report::Error(_) => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.lock().unwrap().is_empty()
    }
}

impl ErrorSink for RecordingSink {
    fn error(&self, msg: &str) {
        self.reports.lock().unwrap().push(Report::Error(msg.to_string()));
    }

    fn warning(&self, msg: &str) {
        self.reports.lock().unwrap().push(Report::Warning(msg.to_string()));
    }
}
