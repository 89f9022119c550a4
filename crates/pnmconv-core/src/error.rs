//! Error types for raster construction and access.
//!
//! # Usage
//!
//! ```rust
//! use pnmconv_core::{Error, ImageFormat, Image};
//!
//! let err = Image::new(ImageFormat::Grayscale, 0, 10, 255).unwrap_err();
//! assert!(matches!(err, Error::InvalidDimensions { .. }));
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or slicing an [`Image`](crate::Image).
///
/// # Categories
///
/// - **Geometry errors**: [`InvalidDimensions`](Error::InvalidDimensions),
///   [`InvalidMaxValue`](Error::InvalidMaxValue),
///   [`SampleCountMismatch`](Error::SampleCountMismatch)
/// - **Allocation errors**: [`AllocationFailed`](Error::AllocationFailed)
/// - **Region errors**: [`InvalidRegion`](Error::InvalidRegion)
#[derive(Debug, Error)]
pub enum Error {
    /// Width or height is zero, or the sample count overflows `usize`.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Why the geometry was rejected.
        reason: String,
    },

    /// The declared white point is zero or above 65535.
    #[error("invalid max value {0}: must be in 1..=65535")]
    InvalidMaxValue(u32),

    /// The sample buffer could not be reserved.
    #[error("failed to allocate {requested} samples: {reason}")]
    AllocationFailed {
        /// Number of samples requested.
        requested: usize,
        /// Allocator message.
        reason: String,
    },

    /// A raw buffer does not match `width * height * channels`.
    #[error("sample count mismatch: expected {expected}, got {actual}")]
    SampleCountMismatch {
        /// Required number of samples.
        expected: usize,
        /// Number of samples supplied.
        actual: usize,
    },

    /// Row ranges handed to [`Image::bands_mut`](crate::Image::bands_mut) do not
    /// tile `[0, height)`.
    #[error("row ranges do not cover 0..{height}: {reason}")]
    InvalidRegion {
        /// Image height the ranges must cover.
        height: u32,
        /// What went wrong.
        reason: String,
    },
}

impl Error {
    #[inline]
    pub(crate) fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    #[inline]
    pub(crate) fn invalid_region(height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidRegion {
            height,
            reason: reason.into(),
        }
    }

    /// Returns `true` for [`Error::AllocationFailed`].
    #[inline]
    pub fn is_allocation_error(&self) -> bool {
        matches!(self, Self::AllocationFailed { .. })
    }
}
