//! Error types for touchsize

use thiserror::Error;

/// Errors that can occur while configuring or running a measurement session
#[derive(Debug, Error)]
pub enum MeasureError {
    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),

    #[error("Device does not have {0}")]
    MissingAxis(&'static str),

    #[error("Touch data received before any tracking id; no active sequence")]
    NoActiveSequence,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Recording parse error on line {line}: {message}")]
    RecordingParse { line: usize, message: String },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
