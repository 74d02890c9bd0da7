//! Error types for entropy coding operations.

use thiserror::Error;

/// Result type alias for entropy coding operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Entropy codec error types.
#[derive(Debug, Error)]
pub enum Error {
    /// Coding parameters are invalid (histogram, table size, alphabet).
    #[error("invalid parameters: {message}")]
    InvalidParams { message: String },

    /// Buffer too small for output.
    #[error("buffer too small: need {required} bytes, got {provided}")]
    BufferTooSmall { required: usize, provided: usize },

    /// A bit read would cross the end of the stream.
    #[error("out of bits: requested {requested} bits at position {position} of {total_bits}")]
    OutOfBits {
        requested: u32,
        position: usize,
        total_bits: usize,
    },

    /// The encoded stream ended before the declared symbol count was produced.
    #[error("truncated stream: {message}")]
    DecodeTruncated { message: String },

    /// The decoder did not finish in the terminal state.
    #[error("invalid decoder state: finished in {state}, expected {expected}")]
    DecodeInvalidState { state: u32, expected: u32 },

    /// Requested bit ordering is not supported.
    #[error("unsupported bit ordering: {0}")]
    UnsupportedOrdering(String),

    /// I/O error from an underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid-parameters error.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Error::InvalidParams {
            message: message.into(),
        }
    }

    /// Create a buffer too small error.
    pub fn buffer_too_small(required: usize, provided: usize) -> Self {
        Error::BufferTooSmall { required, provided }
    }

    /// Create an out-of-bits error.
    pub fn out_of_bits(requested: u32, position: usize, total_bits: usize) -> Self {
        Error::OutOfBits {
            requested,
            position,
            total_bits,
        }
    }

    /// Create a truncated-stream error.
    pub fn truncated(message: impl Into<String>) -> Self {
        Error::DecodeTruncated {
            message: message.into(),
        }
    }

    /// Create a truncated-stream error with offset context.
    pub fn truncated_at(message: impl Into<String>, offset: usize) -> Self {
        Error::DecodeTruncated {
            message: format!("{} at offset {}", message.into(), offset),
        }
    }

    /// Create an invalid-state error.
    pub fn invalid_state(state: u32, expected: u32) -> Self {
        Error::DecodeInvalidState { state, expected }
    }

    /// Check if the error indicates corrupt or truncated input rather than misuse.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Error::DecodeTruncated { .. }
                | Error::DecodeInvalidState { .. }
                | Error::OutOfBits { .. }
        )
    }

    /// Get error category for metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Error::InvalidParams { .. } => "invalid_params",
            Error::BufferTooSmall { .. } => "buffer_too_small",
            Error::OutOfBits { .. } => "out_of_bits",
            Error::DecodeTruncated { .. } => "decode_truncated",
            Error::DecodeInvalidState { .. } => "decode_invalid_state",
            Error::UnsupportedOrdering(_) => "unsupported_ordering",
            Error::Io(_) => "io_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_params("histogram must not be empty");
        assert_eq!(
            err.to_string(),
            "invalid parameters: histogram must not be empty"
        );

        let err = Error::buffer_too_small(100, 10);
        assert_eq!(err.to_string(), "buffer too small: need 100 bytes, got 10");

        let err = Error::out_of_bits(12, 30, 40);
        assert_eq!(
            err.to_string(),
            "out of bits: requested 12 bits at position 30 of 40"
        );
    }

    #[test]
    fn test_error_category() {
        assert_eq!(Error::invalid_params("x").category(), "invalid_params");
        assert_eq!(Error::truncated("x").category(), "decode_truncated");
        assert_eq!(Error::invalid_state(5, 0).category(), "decode_invalid_state");
        assert_eq!(
            Error::UnsupportedOrdering("middle-endian".into()).category(),
            "unsupported_ordering"
        );
    }

    #[test]
    fn test_data_error_classification() {
        assert!(Error::truncated("short").is_data_error());
        assert!(Error::invalid_state(1, 0).is_data_error());
        assert!(Error::out_of_bits(8, 0, 0).is_data_error());
        assert!(!Error::invalid_params("bad").is_data_error());
        assert!(!Error::buffer_too_small(2, 1).is_data_error());
    }
}
