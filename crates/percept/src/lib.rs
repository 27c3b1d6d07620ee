#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use percept_tensor as tensor;

#[doc(inline)]
pub use percept_image as image;
