use crate::{
    device::Device,
    dtype::{Dtype, Element},
    error::TensorError,
    storage::TensorStorage,
};

/// Computes the strides for a row-major (C-contiguous) layout.
///
/// The rightmost dimension has stride 1 and each dimension's stride is the
/// product of the dimensions to its right.
///
/// # Examples
///
/// ```rust
/// use percept_tensor::strides_for;
///
/// assert_eq!(strides_for(&[2, 3]), vec![3, 1]);
/// assert_eq!(strides_for(&[2, 3, 4]), vec![12, 4, 1]);
/// ```
pub fn strides_for(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    let mut stride = 1;
    for i in (0..shape.len()).rev() {
        strides[i] = stride;
        stride *= shape[i];
    }
    strides
}

/// A device-resident buffer with shape, strides and a runtime dtype tag.
///
/// The storage is reference counted: [`Tensor::clone`], [`Tensor::reshape`]
/// and [`Tensor::permute`] share the same bytes. Mutable access requires
/// the storage to be uniquely held and fails with
/// [`TensorError::StorageShared`] otherwise.
///
/// # Examples
///
/// ```rust
/// use percept_tensor::{Device, Dtype, Tensor};
///
/// let t = Tensor::from_vec(&[2, 3], vec![1u8, 2, 3, 4, 5, 6], &Device::CPU).unwrap();
/// assert_eq!(t.shape(), &[2, 3]);
/// assert_eq!(t.dtype(), Dtype::UInt8);
/// assert_eq!(t.as_slice::<u8>().unwrap(), &[1, 2, 3, 4, 5, 6]);
/// ```
#[derive(Debug, Clone)]
pub struct Tensor {
    storage: TensorStorage,
    shape: Vec<usize>,
    strides: Vec<usize>,
    dtype: Dtype,
}

impl Tensor {
    /// Creates a zero-filled tensor with the given shape, dtype and device.
    ///
    /// # Errors
    ///
    /// Returns an error if no backend serves `device` or allocation fails.
    pub fn zeros(shape: &[usize], dtype: Dtype, device: &Device) -> Result<Self, TensorError> {
        let numel = shape.iter().product::<usize>();
        let storage = TensorStorage::zeroed(numel * dtype.size_of(), device)?;
        Ok(Self {
            storage,
            shape: shape.to_vec(),
            strides: strides_for(shape),
            dtype,
        })
    }

    /// Creates a tensor with the given shape from a vector of elements.
    ///
    /// The dtype is taken from the element type.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of elements does not match the shape
    /// or the device has no backend.
    pub fn from_vec<T: Element>(
        shape: &[usize],
        data: Vec<T>,
        device: &Device,
    ) -> Result<Self, TensorError> {
        let numel = shape.iter().product::<usize>();
        if numel != data.len() {
            return Err(TensorError::InvalidShape {
                expected: numel,
                actual: data.len(),
            });
        }
        let storage = TensorStorage::from_vec(data, device)?;
        Ok(Self {
            storage,
            shape: shape.to_vec(),
            strides: strides_for(shape),
            dtype: T::DTYPE,
        })
    }

    /// Creates a tensor with raw bytes reinterpreted as `dtype`.
    ///
    /// # Errors
    ///
    /// Returns an error if the byte count does not equal
    /// `numel * dtype.size_of()` or the device has no backend.
    pub fn from_bytes(
        shape: &[usize],
        dtype: Dtype,
        data: Vec<u8>,
        device: &Device,
    ) -> Result<Self, TensorError> {
        let expected = shape.iter().product::<usize>() * dtype.size_of();
        if expected != data.len() {
            return Err(TensorError::InvalidShape {
                expected,
                actual: data.len(),
            });
        }
        let storage = TensorStorage::from_vec(data, device)?;
        Ok(Self {
            storage,
            shape: shape.to_vec(),
            strides: strides_for(shape),
            dtype,
        })
    }

    /// Creates a tensor with no elements.
    ///
    /// Empty tensors never touch a backend, so construction is
    /// infallible for any device tag.
    ///
    /// # Panics
    ///
    /// Panics if the shape has a non-zero element count.
    pub fn empty(shape: &[usize], dtype: Dtype, device: &Device) -> Self {
        assert_eq!(
            shape.iter().product::<usize>(),
            0,
            "empty tensor shape must have zero elements"
        );
        Self {
            storage: TensorStorage::empty(device),
            shape: shape.to_vec(),
            strides: strides_for(shape),
            dtype,
        }
    }

    /// Returns the shape of the tensor.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the strides of the tensor, in elements.
    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Returns the number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Returns the total number of elements.
    #[inline]
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Returns the dtype tag.
    #[inline]
    pub fn dtype(&self) -> Dtype {
        self.dtype
    }

    /// Returns the device the tensor lives on.
    #[inline]
    pub fn device(&self) -> Device {
        self.storage.device()
    }

    /// Returns true if two tensors share the same storage.
    #[inline]
    pub fn ptr_eq(&self, other: &Tensor) -> bool {
        self.storage.ptr_eq(&other.storage)
    }

    /// Returns true if the memory layout is row-major contiguous.
    pub fn is_contiguous(&self) -> bool {
        self.strides == strides_for(&self.shape)
    }

    /// Returns the linear element offset of a multi-dimensional index.
    ///
    /// # Panics
    ///
    /// Panics if the index rank does not match the tensor rank or any
    /// coordinate is out of bounds.
    pub fn offset_of(&self, index: &[usize]) -> usize {
        assert_eq!(
            index.len(),
            self.rank(),
            "index rank {} does not match tensor rank {}",
            index.len(),
            self.rank()
        );
        let mut offset = 0;
        for (dim, (&i, (&size, &stride))) in index
            .iter()
            .zip(self.shape.iter().zip(self.strides.iter()))
            .enumerate()
        {
            assert!(
                i < size,
                "index {} out of bounds for dimension {} of size {}",
                i,
                dim,
                size
            );
            offset += i * stride;
        }
        offset
    }

    /// Returns the tensor data as a typed slice.
    ///
    /// # Errors
    ///
    /// Returns an error if `T` does not match the dtype, the tensor is not
    /// contiguous, or the data is not in host memory.
    pub fn as_slice<T: Element>(&self) -> Result<&[T], TensorError> {
        if T::DTYPE != self.dtype {
            return Err(TensorError::TypeMismatch {
                expected: self.dtype,
                actual: T::DTYPE,
            });
        }
        if !self.is_contiguous() {
            return Err(TensorError::NotContiguous);
        }
        self.storage.as_slice::<T>()
    }

    /// Returns the tensor data as a typed mutable slice.
    ///
    /// # Errors
    ///
    /// As [`Tensor::as_slice`], and additionally if the storage is shared
    /// with another tensor.
    pub fn as_slice_mut<T: Element>(&mut self) -> Result<&mut [T], TensorError> {
        if T::DTYPE != self.dtype {
            return Err(TensorError::TypeMismatch {
                expected: self.dtype,
                actual: T::DTYPE,
            });
        }
        if !self.is_contiguous() {
            return Err(TensorError::NotContiguous);
        }
        self.storage.as_mut_slice::<T>()
    }

    /// Returns the raw bytes of the tensor data.
    ///
    /// # Errors
    ///
    /// Returns an error if the tensor is not contiguous or not in host
    /// memory.
    pub fn as_bytes(&self) -> Result<&[u8], TensorError> {
        if !self.is_contiguous() {
            return Err(TensorError::NotContiguous);
        }
        self.storage.as_bytes()
    }

    /// Returns a tensor with a new shape sharing this tensor's storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the element counts differ or the tensor is not
    /// contiguous.
    pub fn reshape(&self, shape: &[usize]) -> Result<Tensor, TensorError> {
        let expected = shape.iter().product::<usize>();
        if expected != self.numel() {
            return Err(TensorError::InvalidShape {
                expected,
                actual: self.numel(),
            });
        }
        if !self.is_contiguous() {
            return Err(TensorError::NotContiguous);
        }
        Ok(Tensor {
            storage: self.storage.clone(),
            shape: shape.to_vec(),
            strides: strides_for(shape),
            dtype: self.dtype,
        })
    }

    /// Returns a tensor with permuted dimensions sharing this tensor's
    /// storage.
    ///
    /// The result is generally not contiguous.
    ///
    /// # Errors
    ///
    /// Returns an error if `dims` is not a permutation of `0..rank`.
    pub fn permute(&self, dims: &[usize]) -> Result<Tensor, TensorError> {
        let rank = self.rank();
        let mut seen = vec![false; rank];
        for &d in dims {
            if d >= rank || seen[d] {
                return Err(TensorError::InvalidPermutation {
                    dims: dims.to_vec(),
                    rank,
                });
            }
            seen[d] = true;
        }
        if dims.len() != rank {
            return Err(TensorError::InvalidPermutation {
                dims: dims.to_vec(),
                rank,
            });
        }
        let shape = dims.iter().map(|&d| self.shape[d]).collect();
        let strides = dims.iter().map(|&d| self.strides[d]).collect();
        Ok(Tensor {
            storage: self.storage.clone(),
            shape,
            strides,
            dtype: self.dtype,
        })
    }

    /// Returns a copy of the tensor on the given device.
    ///
    /// Transfers to the tensor's own device are free and share storage;
    /// everything else runs one backend copy.
    ///
    /// # Errors
    ///
    /// Returns an error if no backend serves `device` or the copy fails.
    pub fn to_device(&self, device: &Device) -> Result<Tensor, TensorError> {
        if *device == self.device() {
            return Ok(self.clone());
        }
        log::debug!(
            "transferring {} bytes from {} to {}",
            self.storage.len(),
            self.device(),
            device
        );
        let mut storage = TensorStorage::zeroed(self.storage.len(), device)?;
        storage.copy_from(&self.storage)?;
        Ok(Tensor {
            storage,
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            dtype: self.dtype,
        })
    }

    /// Overwrites this tensor's data with the data of `src`.
    ///
    /// Both tensors must agree in dtype, shape and device; crossing
    /// devices is an explicit [`Tensor::to_device`] instead.
    ///
    /// # Errors
    ///
    /// Returns an error on any disagreement, or if this tensor's storage
    /// is shared or either tensor is not contiguous.
    pub fn copy_from(&mut self, src: &Tensor) -> Result<(), TensorError> {
        if self.dtype != src.dtype {
            return Err(TensorError::TypeMismatch {
                expected: self.dtype,
                actual: src.dtype,
            });
        }
        if self.shape != src.shape {
            return Err(TensorError::ShapeMismatch {
                expected: self.shape.clone(),
                actual: src.shape.clone(),
            });
        }
        if self.device() != src.device() {
            return Err(TensorError::DeviceMismatch {
                expected: self.device(),
                actual: src.device(),
            });
        }
        if !self.is_contiguous() || !src.is_contiguous() {
            return Err(TensorError::NotContiguous);
        }
        self.storage.copy_from(&src.storage)
    }
}
