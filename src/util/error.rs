//! Error types for stereomatch.

use thiserror::Error;

/// Result alias for stereomatch operations.
pub type StereoResult<T> = std::result::Result<T, StereoError>;

/// Errors that can occur when running the stereo pipeline.
///
/// Numeric degeneracies (flat correlation windows, flat maps at
/// normalization) are not errors: they are resolved where they occur.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StereoError {
    /// An input image could not be read or decoded.
    #[error("failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },
    /// An output image could not be encoded or written.
    #[error("failed to encode {path}: {reason}")]
    Encode { path: String, reason: String },
    /// Two images or maps that must share a size do not.
    #[error(
        "dimension mismatch: {left_width}x{left_height} vs {right_width}x{right_height}"
    )]
    DimensionMismatch {
        left_width: usize,
        left_height: usize,
        right_width: usize,
        right_height: usize,
    },
    /// Width or height is zero or overflows the address space.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// A buffer is shorter than its declared dimensions require.
    #[error("buffer too small: need {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// An owned buffer does not exactly match its declared dimensions.
    #[error("buffer size mismatch: expected {expected} elements, got {got}")]
    BufferSizeMismatch { expected: usize, got: usize },
    /// The downscale factor does not divide the input size.
    #[error("scale factor {factor} does not divide {width}x{height}")]
    ScaleNotDivisible {
        width: usize,
        height: usize,
        factor: usize,
    },
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Configuration(&'static str),
}

impl StereoError {
    /// Builds a mismatch error from two `(width, height)` pairs.
    pub(crate) fn mismatch(left: (usize, usize), right: (usize, usize)) -> Self {
        StereoError::DimensionMismatch {
            left_width: left.0,
            left_height: left.1,
            right_width: right.0,
            right_height: right.1,
        }
    }
}
