use thiserror::Error;

use crate::{device::Device, dtype::Dtype};

/// An error type for tensor operations.
///
/// Covers construction, element access, layout manipulation and device
/// placement failures. All variants are reported synchronously by the
/// operation that detects them; no operation leaves a tensor partially
/// written after returning an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TensorError {
    /// The number of data elements does not match the requested shape.
    #[error("Shape mismatch: expected {expected} elements for shape, but got {actual}")]
    InvalidShape {
        /// Expected number of elements based on the shape.
        expected: usize,
        /// Actual number of elements provided.
        actual: usize,
    },

    /// Two tensors that must agree in shape do not.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Shape of the destination tensor.
        expected: Vec<usize>,
        /// Shape of the source tensor.
        actual: Vec<usize>,
    },

    /// The axis list passed to `permute` is not a permutation of `0..rank`.
    #[error("Invalid permutation {dims:?} for tensor of rank {rank}")]
    InvalidPermutation {
        /// The offending axis list.
        dims: Vec<usize>,
        /// The rank of the tensor.
        rank: usize,
    },

    /// Typed access with an element type that does not match the tensor dtype.
    #[error("Dtype mismatch: tensor holds {expected}, requested {actual}")]
    TypeMismatch {
        /// Dtype carried by the tensor.
        expected: Dtype,
        /// Dtype implied by the requested element type.
        actual: Dtype,
    },

    /// The operation requires a row-major contiguous tensor.
    #[error("Tensor memory is not contiguous")]
    NotContiguous,

    /// Two tensors that must live on the same device do not.
    #[error("Device mismatch: expected {expected}, got {actual}")]
    DeviceMismatch {
        /// The device the operation was resolved for.
        expected: Device,
        /// The device actually encountered.
        actual: Device,
    },

    /// No backend is compiled in for the requested device.
    #[error("No backend available for device {0}")]
    UnsupportedDevice(Device),

    /// A device string could not be parsed.
    #[error("Invalid device string: {0:?}")]
    InvalidDevice(String),

    /// In-place mutation was attempted while the storage is shared with
    /// another live tensor.
    #[error("Storage is shared; clone the tensor before mutating it")]
    StorageShared,

    /// The backend failed to allocate the requested buffer.
    #[error("Failed to allocate {bytes} bytes on device")]
    AllocationFailed {
        /// Requested buffer size in bytes.
        bytes: usize,
    },

    /// The requested size and alignment do not form a valid memory layout.
    #[error("Invalid memory layout: {0}")]
    LayoutError(core::alloc::LayoutError),
}
