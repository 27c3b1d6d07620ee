//! Runtime element-type tags and the bridge to concrete Rust scalars.
//!
//! Tensors carry their element type as a [`Dtype`] value instead of a type
//! parameter, so images with different pixel formats can flow through the
//! same pipeline plumbing. Numeric kernels recover a concrete type with
//! [`dispatch_dtype!`], which instantiates a generic body once per
//! supported dtype.

use num_traits::Bounded;

/// Element type tag carried by a tensor at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dtype {
    /// 8-bit unsigned integer.
    UInt8,
    /// 16-bit unsigned integer.
    UInt16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit IEEE-754 float.
    Float32,
    /// 64-bit IEEE-754 float.
    Float64,
}

impl Dtype {
    /// Returns the size of one element in bytes.
    pub const fn size_of(&self) -> usize {
        match self {
            Dtype::UInt8 => 1,
            Dtype::UInt16 => 2,
            Dtype::Int32 => 4,
            Dtype::Int64 => 8,
            Dtype::Float32 => 4,
            Dtype::Float64 => 8,
        }
    }

    /// Returns true for the floating point dtypes.
    pub const fn is_float(&self) -> bool {
        matches!(self, Dtype::Float32 | Dtype::Float64)
    }

    /// Returns true for the integer dtypes.
    pub const fn is_int(&self) -> bool {
        !self.is_float()
    }
}

impl std::fmt::Display for Dtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Dtype::UInt8 => "uint8",
            Dtype::UInt16 => "uint16",
            Dtype::Int32 => "int32",
            Dtype::Int64 => "int64",
            Dtype::Float32 => "float32",
            Dtype::Float64 => "float64",
        };
        write!(f, "{}", name)
    }
}

/// A Rust scalar that a [`Dtype`] tag can stand for.
///
/// The trait carries the conversions used by every numeric kernel: values
/// are widened to `f64` for arithmetic and narrowed back on write. The
/// narrowing conversion rounds half away from zero and saturates to the
/// target range for integer types, so affine transforms never wrap.
pub trait Element: Copy + Send + Sync + PartialOrd + std::fmt::Debug + 'static {
    /// The runtime tag matching this type.
    const DTYPE: Dtype;

    /// Widens the value to `f64`.
    fn to_f64(self) -> f64;

    /// Narrows an `f64` into this type, rounding and saturating for
    /// integer types. `NaN` narrows to zero.
    fn from_f64(v: f64) -> Self;
}

macro_rules! impl_element_int {
    ($t:ty, $dtype:expr) => {
        impl Element for $t {
            const DTYPE: Dtype = $dtype;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                let lo = <$t as Bounded>::min_value() as f64;
                let hi = <$t as Bounded>::max_value() as f64;
                // `as` saturates on overflow and maps NaN to zero.
                v.round().clamp(lo, hi) as $t
            }
        }
    };
}

macro_rules! impl_element_float {
    ($t:ty, $dtype:expr) => {
        impl Element for $t {
            const DTYPE: Dtype = $dtype;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }
        }
    };
}

impl_element_int!(u8, Dtype::UInt8);
impl_element_int!(u16, Dtype::UInt16);
impl_element_int!(i32, Dtype::Int32);
impl_element_int!(i64, Dtype::Int64);
impl_element_float!(f32, Dtype::Float32);
impl_element_float!(f64, Dtype::Float64);

/// Instantiates a generic body once per supported dtype.
///
/// The first argument is a [`Dtype`] expression; the body is expanded with
/// the given identifier bound to the matching Rust scalar type.
///
/// # Examples
///
/// ```rust
/// use percept_tensor::{dispatch_dtype, Dtype};
///
/// fn element_size(dtype: Dtype) -> usize {
///     dispatch_dtype!(dtype, |T| std::mem::size_of::<T>())
/// }
///
/// assert_eq!(element_size(Dtype::UInt16), 2);
/// assert_eq!(element_size(Dtype::Float64), 8);
/// ```
#[macro_export]
macro_rules! dispatch_dtype {
    ($dtype:expr, |$t:ident| $body:expr) => {
        match $dtype {
            $crate::Dtype::UInt8 => {
                type $t = u8;
                $body
            }
            $crate::Dtype::UInt16 => {
                type $t = u16;
                $body
            }
            $crate::Dtype::Int32 => {
                type $t = i32;
                $body
            }
            $crate::Dtype::Int64 => {
                type $t = i64;
                $body
            }
            $crate::Dtype::Float32 => {
                type $t = f32;
                $body
            }
            $crate::Dtype::Float64 => {
                type $t = f64;
                $body
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_size() {
        assert_eq!(Dtype::UInt8.size_of(), 1);
        assert_eq!(Dtype::UInt16.size_of(), 2);
        assert_eq!(Dtype::Int32.size_of(), 4);
        assert_eq!(Dtype::Int64.size_of(), 8);
        assert_eq!(Dtype::Float32.size_of(), 4);
        assert_eq!(Dtype::Float64.size_of(), 8);
    }

    #[test]
    fn test_dtype_classification() {
        assert!(Dtype::Float32.is_float());
        assert!(Dtype::Float64.is_float());
        assert!(Dtype::UInt8.is_int());
        assert!(Dtype::Int64.is_int());
        assert!(!Dtype::UInt16.is_float());
    }

    #[test]
    fn test_dtype_display() {
        assert_eq!(Dtype::UInt8.to_string(), "uint8");
        assert_eq!(Dtype::Float64.to_string(), "float64");
    }

    #[test]
    fn test_element_round_half_away_from_zero() {
        assert_eq!(u8::from_f64(157.5), 158);
        assert_eq!(u8::from_f64(157.4), 157);
        assert_eq!(i32::from_f64(-2.5), -3);
        assert_eq!(i32::from_f64(-2.4), -2);
    }

    #[test]
    fn test_element_saturation() {
        assert_eq!(u8::from_f64(300.0), 255);
        assert_eq!(u8::from_f64(-5.0), 0);
        assert_eq!(u16::from_f64(1e9), u16::MAX);
        assert_eq!(i32::from_f64(f64::INFINITY), i32::MAX);
        assert_eq!(u8::from_f64(f64::NAN), 0);
    }

    #[test]
    fn test_element_float_passthrough() {
        assert_eq!(f32::from_f64(0.25), 0.25f32);
        assert_eq!(f64::from_f64(-1.5), -1.5);
    }

    #[test]
    fn test_dispatch_matches_tag() {
        for dtype in [
            Dtype::UInt8,
            Dtype::UInt16,
            Dtype::Int32,
            Dtype::Int64,
            Dtype::Float32,
            Dtype::Float64,
        ] {
            let tagged = dispatch_dtype!(dtype, |T| <T as Element>::DTYPE);
            assert_eq!(tagged, dtype);
        }
    }
}
