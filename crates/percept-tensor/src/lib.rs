#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `percept-tensor` provides the shared buffer primitive the rest of the
//! pipeline exchanges pixel data through: a device-resident, contiguous
//! allocation with shape and stride metadata and a runtime [`Dtype`] tag.
//! Storage is reference counted, so clones, reshapes and permutes are
//! zero-copy; mutation requires a uniquely held buffer.
//!
//! The element type is a runtime value rather than a type parameter.
//! Kernels recover a concrete scalar type with [`dispatch_dtype!`] and the
//! [`Element`] trait, which also fixes the numeric write-back policy:
//! integer narrowing rounds half away from zero and saturates.
//!
//! Device placement is explicit. A [`Device`] is a `{kind, index}` tag
//! resolved to a [`Backend`] per operation; the only implicit behavior is
//! that every `cpu:N` index is served by the one host backend.
//!
//! # Quick Start
//!
//! ```rust
//! use percept_tensor::{Device, Dtype, Tensor};
//!
//! // A zero-filled buffer on the host.
//! let t = Tensor::zeros(&[2, 3, 1], Dtype::UInt8, &Device::CPU).unwrap();
//! assert_eq!(t.numel(), 6);
//!
//! // A buffer built from data, dtype inferred from the element type.
//! let t = Tensor::from_vec(&[2, 2], vec![1.0f32, 2.0, 3.0, 4.0], &Device::CPU).unwrap();
//! assert_eq!(t.dtype(), Dtype::Float32);
//! assert_eq!(t.as_slice::<f32>().unwrap(), &[1.0, 2.0, 3.0, 4.0]);
//! ```

/// Backend module containing device memory operation abstractions.
pub mod backend;

/// Device module containing the device placement tag.
pub mod device;

/// Dtype module containing runtime element-type tags and dispatch.
pub mod dtype;

/// Error module containing the tensor error type.
pub mod error;

/// Scalar module containing the runtime-typed element value.
pub mod scalar;

/// Serde module for serialization and deserialization of host tensors.
///
/// Available when the `serde` feature is enabled.
#[cfg(feature = "serde")]
pub mod serde;

/// Storage module containing the reference-counted device buffer.
pub mod storage;

/// Tensor module containing the main tensor implementation.
pub mod tensor;

pub use crate::backend::{backend_for, Backend, CpuBackend};
pub use crate::device::{Device, DeviceKind};
pub use crate::dtype::{Dtype, Element};
pub use crate::error::TensorError;
pub use crate::scalar::Scalar;
pub use crate::storage::TensorStorage;
pub use crate::tensor::{strides_for, Tensor};
