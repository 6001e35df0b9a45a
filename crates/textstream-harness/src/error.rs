//! Harness failures.

use thiserror::Error;

use textstream_core::StreamError;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown format flag '{0}'")]
    UnknownFlag(String),
    #[error("cannot parse value '{0}'")]
    BadValue(String),
    #[error("stream: {0}")]
    Stream(#[from] StreamError),
}

impl HarnessError {
    /// Stable snake_case name used by fixtures' `expected_error`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::UnknownFlag(_) => "unknown_flag",
            Self::BadValue(_) => "bad_value",
            Self::Stream(err) => stream_error_kind(err),
        }
    }
}

#[must_use]
pub fn stream_error_kind(err: &StreamError) -> &'static str {
    match err {
        StreamError::CapacityExceeded { .. } => "capacity_exceeded",
        StreamError::NulInText { .. } => "nul_in_text",
        StreamError::SeekOutOfRange { .. } => "seek_out_of_range",
        StreamError::InvalidBase(_) => "invalid_base",
        StreamError::SpecOverflow { .. } => "spec_overflow",
        StreamError::InvalidUtf8 => "invalid_utf8",
        StreamError::Format(_) => "format",
    }
}
