#![deny(missing_docs)]
//! Tensor-backed image type and per-pixel processing kernels

/// Image representation backed by a shared tensor.
pub mod image;

/// Error types for the image module.
pub mod error;

/// Color-space conversions.
pub mod color;

/// Device-dispatched kernel strategies for the image operations.
pub mod kernel;

/// Legacy fixed-layout interchange format.
pub mod legacy;

/// Morphological operations.
pub mod morphology;

/// Dtype conversion and intensity transforms.
pub mod ops;

pub use crate::color::ColorConversion;
pub use crate::error::ImageError;
pub use crate::image::Image;
pub use crate::legacy::LegacyImage;
pub use crate::ops::default_scale;
