use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::warn;

use crate::report::report_model::TestOutcome;

/// One line of the outcome trace.
#[derive(Debug, Serialize)]
pub struct TraceRecord<'a> {
    pub timestamp_ms: u128,
    #[serde(flatten)]
    pub outcome: &'a TestOutcome,
}

impl<'a> TraceRecord<'a> {
    pub fn now(outcome: &'a TestOutcome) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        Self {
            timestamp_ms,
            outcome,
        }
    }
}

/// Append-only JSONL log of finished tests, shared by the suite's workers.
///
/// Write failures are logged and otherwise ignored; the trace never fails a
/// run.
pub struct TraceLogger {
    file: Option<Mutex<File>>,
}

impl TraceLogger {
    pub fn new(path: &Path) -> Self {
        let file = OpenOptions::new().create(true).append(true).open(path);

        match file {
            Ok(f) => Self {
                file: Some(Mutex::new(f)),
            },
            Err(e) => {
                warn!("could not open trace file '{}': {}", path.display(), e);
                Self { file: None }
            }
        }
    }

    /// A logger that writes nothing.
    pub fn disabled() -> Self {
        Self { file: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    pub fn log(&self, outcome: &TestOutcome) {
        let Some(file_mutex) = &self.file else {
            return;
        };

        let json = match serde_json::to_string(&TraceRecord::now(outcome)) {
            Ok(j) => j,
            Err(e) => {
                warn!("failed to serialize trace record: {}", e);
                return;
            }
        };

        let mut file = match file_mutex.lock() {
            Ok(f) => f,
            Err(e) => {
                warn!("trace logger lock poisoned: {}", e);
                return;
            }
        };

        if let Err(e) = writeln!(file, "{}", json) {
            warn!("failed to write trace record: {}", e);
        }
    }
}
