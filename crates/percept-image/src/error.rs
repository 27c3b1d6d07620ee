use percept_tensor::{Dtype, TensorError};

/// An error type for image operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ImageError {
    /// Error when the image extents are not valid.
    #[error("Invalid image shape {rows}x{cols}x{channels}; channels must be >= 1")]
    InvalidShape {
        /// Number of rows requested.
        rows: usize,
        /// Number of columns requested.
        cols: usize,
        /// Number of channels requested.
        channels: usize,
    },

    /// Error when a tensor of the wrong rank is wrapped as an image.
    #[error("Expected a tensor of rank 2 or 3, got rank {0}")]
    InvalidRank(usize),

    /// Error when an operation requires a specific channel count.
    #[error("Expected {expected} channels, got {actual}")]
    InvalidChannelCount {
        /// Channel count the operation requires.
        expected: usize,
        /// Channel count of the image.
        actual: usize,
    },

    /// Error when an operation does not support the image dtype.
    #[error("Operation {op} does not support dtype {dtype}")]
    UnsupportedDtype {
        /// Name of the rejecting operation.
        op: &'static str,
        /// The offending dtype.
        dtype: Dtype,
    },

    /// Error when a legacy image carries a channel width with no dtype.
    #[error("No dtype matches {0} bytes per channel; expected 1, 2 or 4")]
    UnsupportedBytesPerChannel(usize),

    /// Error bubbled up from the tensor layer.
    #[error(transparent)]
    Tensor(#[from] TensorError),
}
