//! Arc-based storage for device buffers.
//!
//! Storage is an untyped byte buffer tagged with the device it lives on.
//! Cloning a storage handle is a reference-count increment; the element
//! type is reattached by the owning tensor, which validates its dtype tag
//! before handing out typed slices.

use std::{alloc::Layout, ptr::NonNull, sync::Arc};

use crate::{
    backend::backend_for,
    device::Device,
    dtype::Element,
    error::TensorError,
};

/// Alignment for every storage allocation, wide enough for all dtypes.
const STORAGE_ALIGN: usize = 8;

/// Inner storage holding the actual buffer.
///
/// Wrapped in an `Arc` so handles can share one allocation; the final
/// handle returns the buffer to its backend.
struct StorageImpl {
    /// Pointer to the buffer; dangling when the layout size is zero.
    ptr: NonNull<u8>,
    /// Layout used for allocation.
    layout: Layout,
    /// Device the buffer lives on.
    device: Device,
}

// SAFETY: the buffer is exclusively owned by the Arc; shared references
// only read, and mutable access goes through the uniqueness check in
// `as_mut_slice`.
unsafe impl Send for StorageImpl {}
// SAFETY: see above; all aliasing mutation paths require a unique handle.
unsafe impl Sync for StorageImpl {}

impl Drop for StorageImpl {
    fn drop(&mut self) {
        if self.layout.size() == 0 {
            return;
        }
        // The backend existed at allocation time, so the lookup cannot
        // fail for a live buffer.
        if let Ok(backend) = backend_for(&self.device) {
            // SAFETY: ptr and layout were produced together by this
            // backend and this is the final drop of the buffer.
            unsafe { backend.dealloc(self.ptr.as_ptr(), self.layout) }
        }
    }
}

/// Reference-counted device buffer shared between tensors.
///
/// Clones are cheap and alias the same bytes. Mutable access requires the
/// handle to be unique; a shared handle reports
/// [`TensorError::StorageShared`] instead of copying or racing.
pub struct TensorStorage {
    inner: Arc<StorageImpl>,
}

impl TensorStorage {
    /// Creates a storage holding no bytes on `device`.
    ///
    /// Empty buffers never touch a backend, so any device tag is
    /// representable and construction cannot fail.
    pub fn empty(device: &Device) -> Self {
        Self {
            inner: Arc::new(StorageImpl {
                ptr: NonNull::dangling(),
                layout: Layout::new::<()>(),
                device: *device,
            }),
        }
    }

    /// Allocates a zero-filled buffer of `bytes` on `device`.
    ///
    /// Zero-sized buffers are represented without touching the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if no backend serves `device` or allocation fails.
    pub fn zeroed(bytes: usize, device: &Device) -> Result<Self, TensorError> {
        let backend = backend_for(device)?;
        let layout =
            Layout::from_size_align(bytes, STORAGE_ALIGN).map_err(TensorError::LayoutError)?;
        let ptr = if bytes == 0 {
            NonNull::dangling()
        } else {
            let raw = backend.alloc_zeroed(layout)?;
            NonNull::new(raw).ok_or(TensorError::AllocationFailed { bytes })?
        };
        Ok(Self {
            inner: Arc::new(StorageImpl {
                ptr,
                layout,
                device: *device,
            }),
        })
    }

    /// Allocates a buffer on `device` and fills it with the vector's bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if no backend serves `device` or allocation fails.
    pub fn from_vec<T: Element>(data: Vec<T>, device: &Device) -> Result<Self, TensorError> {
        let backend = backend_for(device)?;
        let bytes = std::mem::size_of_val(data.as_slice());
        let layout =
            Layout::from_size_align(bytes, STORAGE_ALIGN).map_err(TensorError::LayoutError)?;
        let ptr = if bytes == 0 {
            NonNull::dangling()
        } else {
            let raw = backend.alloc(layout)?;
            // SAFETY: `raw` is a fresh allocation of `bytes`, the vector
            // provides `bytes` readable bytes, and the regions are
            // disjoint. The source lives in host memory.
            let copied =
                unsafe { backend.copy(data.as_ptr() as *const u8, raw, bytes, &Device::CPU) };
            if let Err(e) = copied {
                // SAFETY: `raw` came from this backend and is unused.
                unsafe { backend.dealloc(raw, layout) };
                return Err(e);
            }
            NonNull::new(raw).ok_or(TensorError::AllocationFailed { bytes })?
        };
        Ok(Self {
            inner: Arc::new(StorageImpl {
                ptr,
                layout,
                device: *device,
            }),
        })
    }

    /// Returns the device the buffer lives on.
    #[inline]
    pub fn device(&self) -> Device {
        self.inner.device
    }

    /// Returns the buffer length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.layout.size()
    }

    /// Returns true if the buffer holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if no other handle shares this buffer.
    #[inline]
    pub fn is_unique(&self) -> bool {
        Arc::strong_count(&self.inner) == 1
    }

    /// Returns true if two handles alias the same buffer.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns the raw pointer to the buffer.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.inner.ptr.as_ptr()
    }

    /// Returns the raw mutable pointer to the buffer.
    ///
    /// # Safety
    ///
    /// The caller must ensure exclusive access when writing through the
    /// returned pointer.
    #[inline]
    pub unsafe fn as_mut_ptr(&mut self) -> *mut u8 {
        self.inner.ptr.as_ptr()
    }

    fn ensure_host(&self) -> Result<(), TensorError> {
        let device = self.device();
        if !device.is_cpu() {
            return Err(TensorError::DeviceMismatch {
                expected: Device::cpu(device.index()),
                actual: device,
            });
        }
        Ok(())
    }

    /// Returns the buffer as a typed slice.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is not in host memory.
    pub fn as_slice<T: Element>(&self) -> Result<&[T], TensorError> {
        self.ensure_host()?;
        if self.is_empty() {
            return Ok(&[]);
        }
        let elem_count = self.len() / std::mem::size_of::<T>();
        // SAFETY: the buffer is valid for `len` bytes, allocated with
        // alignment covering every element type, and host-resident.
        Ok(unsafe { std::slice::from_raw_parts(self.as_ptr() as *const T, elem_count) })
    }

    /// Returns the buffer as a typed mutable slice.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is not in host memory or the handle
    /// is shared.
    pub fn as_mut_slice<T: Element>(&mut self) -> Result<&mut [T], TensorError> {
        self.ensure_host()?;
        if !self.is_unique() {
            return Err(TensorError::StorageShared);
        }
        if self.is_empty() {
            return Ok(&mut []);
        }
        let elem_count = self.len() / std::mem::size_of::<T>();
        // SAFETY: as in `as_slice`, plus the handle is unique so no other
        // reference can observe the writes.
        Ok(unsafe {
            std::slice::from_raw_parts_mut(self.inner.ptr.as_ptr() as *mut T, elem_count)
        })
    }

    /// Returns the raw bytes of the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is not in host memory.
    pub fn as_bytes(&self) -> Result<&[u8], TensorError> {
        self.as_slice::<u8>()
    }

    /// Overwrites this buffer with the bytes of `src`.
    ///
    /// The copy runs through this buffer's backend; both buffers must have
    /// the same length, which the owning tensor validates.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is shared or the backend cannot read
    /// from the source device.
    pub fn copy_from(&mut self, src: &TensorStorage) -> Result<(), TensorError> {
        if !self.is_unique() {
            return Err(TensorError::StorageShared);
        }
        debug_assert_eq!(self.len(), src.len());
        if self.is_empty() {
            return Ok(());
        }
        let backend = backend_for(&self.device())?;
        // SAFETY: both buffers are live and sized `len`; the destination
        // handle is unique, so the regions cannot overlap.
        unsafe {
            backend.copy(
                src.as_ptr(),
                self.inner.ptr.as_ptr(),
                src.len(),
                &src.device(),
            )
        }
    }
}

impl Clone for TensorStorage {
    /// Creates a cheap clone sharing the same buffer.
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for TensorStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TensorStorage")
            .field("ptr", &self.inner.ptr)
            .field("len", &self.len())
            .field("device", &self.device())
            .field("is_unique", &self.is_unique())
            .finish()
    }
}
