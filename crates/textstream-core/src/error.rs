//! Stream failure taxonomy.

use thiserror::Error;

use crate::printf::FormatError;

/// Errors surfaced by [`OutputStream`](crate::OutputStream) operations.
///
/// A failed call leaves the stream's position, logical length and committed
/// bytes as they were.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StreamError {
    /// A linked stream was asked to hold more than its fixed memory.
    #[error(
        "write of {requested} bytes at offset {position} exceeds linked capacity {capacity}"
    )]
    CapacityExceeded {
        position: usize,
        requested: usize,
        capacity: usize,
    },
    /// A NUL byte reached the text path; only the `Ends` manipulator may emit one.
    #[error("nul byte in text write at offset {offset}")]
    NulInText { offset: usize },
    #[error("seek target {target} outside [0, {capacity}]")]
    SeekOutOfRange { target: i64, capacity: usize },
    #[error("numeric base {0} outside 2..=36")]
    InvalidBase(u8),
    /// A conversion spec did not fit the builder's scratch area.
    #[error("conversion spec needs {needed} bytes of scratch space")]
    SpecOverflow { needed: usize },
    #[error("committed bytes are not valid UTF-8")]
    InvalidUtf8,
    #[error("format: {0}")]
    Format(#[from] FormatError),
}

impl From<core::str::Utf8Error> for StreamError {
    fn from(_: core::str::Utf8Error) -> Self {
        StreamError::InvalidUtf8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_message_names_all_bounds() {
        let err = StreamError::CapacityExceeded {
            position: 6,
            requested: 4,
            capacity: 8,
        };
        assert_eq!(
            err.to_string(),
            "write of 4 bytes at offset 6 exceeds linked capacity 8"
        );
    }

    #[test]
    fn format_errors_convert() {
        let err: StreamError = FormatError::MissingArgument { index: 0 }.into();
        assert!(matches!(err, StreamError::Format(_)));
    }
}
