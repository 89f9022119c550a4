//! Error types for I/O operations.

use std::io;
use thiserror::Error;

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Tag is not one of the supported ASCII variants.
    #[error("unsupported format: {0:?} (expected P2 or P3)")]
    UnsupportedFormat(String),

    /// Width, height or max value is missing, non-numeric or zero.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// Sample stream ended early.
    #[error("truncated sample data: expected {expected} values, found {actual}")]
    Truncated {
        /// Samples required by the header.
        expected: usize,
        /// Samples actually present.
        actual: usize,
    },

    /// A sample token is not an integer.
    #[error("invalid sample #{index}: {token:?}")]
    InvalidSample {
        /// Zero-based sample position.
        index: usize,
        /// Offending token.
        token: String,
    },

    /// Raster construction failed (allocation, geometry).
    #[error(transparent)]
    Core(#[from] pnmconv_core::Error),
}

impl IoError {
    /// Returns `true` when the input was readable but malformed.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat(_)
                | Self::InvalidHeader(_)
                | Self::Truncated { .. }
                | Self::InvalidSample { .. }
        )
    }
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;
