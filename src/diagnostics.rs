use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;

use crate::error::{BatchError, HandError, MissingField};

/// Receives recoverable parse events. Injected into the parser so the core
/// never reaches for a process-wide logger.
pub trait ParseReporter: Send + Sync {
    fn field_missing(&self, _hand_id: &str, _field: MissingField) {}

    fn hand_failed(&self, _hand_id: &str, _error: &HandError) {}

    fn file_skipped(&self, _path: &Path, _error: &BatchError) {}
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ParseReporter for TracingReporter {
    fn field_missing(&self, hand_id: &str, field: MissingField) {
        tracing::debug!(hand_id, %field, "field missing, using default");
    }

    fn hand_failed(&self, hand_id: &str, error: &HandError) {
        tracing::warn!(hand_id, %error, "hand could not be assembled, emitting placeholder");
    }

    fn file_skipped(&self, path: &Path, error: &BatchError) {
        tracing::warn!(path = %path.display(), %error, "skipping file");
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ParseEvent {
    FieldMissing { hand_id: String, field: MissingField },
    HandFailed { hand_id: String, message: String },
    FileSkipped { path: PathBuf, message: String },
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<ParseEvent>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ParseEvent> {
        self.events.lock().clone()
    }

    pub fn failed_hands(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| matches!(event, ParseEvent::HandFailed { .. }))
            .count()
    }

    pub fn missing_fields(&self, field: MissingField) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| matches!(event, ParseEvent::FieldMissing { field: f, .. } if *f == field))
            .count()
    }
}

impl ParseReporter for CollectingReporter {
    fn field_missing(&self, hand_id: &str, field: MissingField) {
        self.events.lock().push(ParseEvent::FieldMissing {
            hand_id: hand_id.to_string(),
            field,
        });
    }

    fn hand_failed(&self, hand_id: &str, error: &HandError) {
        self.events.lock().push(ParseEvent::HandFailed {
            hand_id: hand_id.to_string(),
            message: error.to_string(),
        });
    }

    fn file_skipped(&self, path: &Path, error: &BatchError) {
        self.events.lock().push(ParseEvent::FileSkipped {
            path: path.to_path_buf(),
            message: error.to_string(),
        });
    }
}
