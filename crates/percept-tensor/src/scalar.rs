use crate::dtype::Dtype;

/// A single element read out of a tensor, tagged with its dtype.
///
/// Returned by element accessors when the caller does not know the tensor
/// dtype at compile time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// A `uint8` element.
    UInt8(u8),
    /// A `uint16` element.
    UInt16(u16),
    /// An `int32` element.
    Int32(i32),
    /// An `int64` element.
    Int64(i64),
    /// A `float32` element.
    Float32(f32),
    /// A `float64` element.
    Float64(f64),
}

impl Scalar {
    /// Returns the dtype tag of the wrapped value.
    pub fn dtype(&self) -> Dtype {
        match self {
            Scalar::UInt8(_) => Dtype::UInt8,
            Scalar::UInt16(_) => Dtype::UInt16,
            Scalar::Int32(_) => Dtype::Int32,
            Scalar::Int64(_) => Dtype::Int64,
            Scalar::Float32(_) => Dtype::Float32,
            Scalar::Float64(_) => Dtype::Float64,
        }
    }

    /// Widens the wrapped value to `f64`.
    pub fn to_f64(&self) -> f64 {
        match *self {
            Scalar::UInt8(v) => v as f64,
            Scalar::UInt16(v) => v as f64,
            Scalar::Int32(v) => v as f64,
            Scalar::Int64(v) => v as f64,
            Scalar::Float32(v) => v as f64,
            Scalar::Float64(v) => v,
        }
    }
}

macro_rules! impl_scalar_from {
    ($t:ty, $variant:ident) => {
        impl From<$t> for Scalar {
            fn from(v: $t) -> Self {
                Scalar::$variant(v)
            }
        }
    };
}

impl_scalar_from!(u8, UInt8);
impl_scalar_from!(u16, UInt16);
impl_scalar_from!(i32, Int32);
impl_scalar_from!(i64, Int64);
impl_scalar_from!(f32, Float32);
impl_scalar_from!(f64, Float64);

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::UInt8(v) => write!(f, "{}", v),
            Scalar::UInt16(v) => write!(f, "{}", v),
            Scalar::Int32(v) => write!(f, "{}", v),
            Scalar::Int64(v) => write!(f, "{}", v),
            Scalar::Float32(v) => write!(f, "{}", v),
            Scalar::Float64(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_dtype() {
        assert_eq!(Scalar::from(7u8).dtype(), Dtype::UInt8);
        assert_eq!(Scalar::from(7.0f32).dtype(), Dtype::Float32);
    }

    #[test]
    fn test_scalar_to_f64() {
        assert_eq!(Scalar::from(250u8).to_f64(), 250.0);
        assert_eq!(Scalar::from(-3i32).to_f64(), -3.0);
        assert_eq!(Scalar::from(0.5f64).to_f64(), 0.5);
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::from(42u16).to_string(), "42");
        assert_eq!(Scalar::from(1.5f32).to_string(), "1.5");
    }
}
