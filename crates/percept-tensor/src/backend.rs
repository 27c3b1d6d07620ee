//! Backend abstraction for device memory operations.
//!
//! A [`Backend`] owns allocation, deallocation and raw copies for one
//! device family. Tensors resolve their backend once per operation through
//! [`backend_for`]; device kinds with no compiled backend fail the lookup
//! instead of failing deep inside a kernel.

use std::alloc::{self, Layout};

use crate::{
    device::{Device, DeviceKind},
    error::TensorError,
};

/// Memory operations for one device family.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the registry hands out shared
/// references across threads.
pub trait Backend: Send + Sync + 'static {
    /// Returns the device kind this backend serves.
    fn kind(&self) -> DeviceKind;

    /// Allocates an uninitialized buffer on the device.
    ///
    /// The layout must have a non-zero size; zero-sized tensors never
    /// reach the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is out of memory.
    fn alloc(&self, layout: Layout) -> Result<*mut u8, TensorError>;

    /// Allocates a zero-filled buffer on the device.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is out of memory.
    fn alloc_zeroed(&self, layout: Layout) -> Result<*mut u8, TensorError>;

    /// Deallocates a buffer previously allocated by this backend.
    ///
    /// # Safety
    ///
    /// The caller must ensure that:
    /// - `ptr` was allocated by this backend
    /// - `ptr` is not used after deallocation
    /// - `layout` matches the original allocation
    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout);

    /// Copies `len` bytes from `src` into a buffer owned by this backend.
    ///
    /// `src_device` names the device holding `src`, so an accelerator
    /// backend can pick the right transfer direction.
    ///
    /// # Errors
    ///
    /// Returns an error if this backend cannot read from `src_device`.
    ///
    /// # Safety
    ///
    /// The caller must ensure that:
    /// - `src` is valid for reads of `len` bytes
    /// - `dst` is valid for writes of `len` bytes
    /// - the regions do not overlap
    unsafe fn copy(
        &self,
        src: *const u8,
        dst: *mut u8,
        len: usize,
        src_device: &Device,
    ) -> Result<(), TensorError>;

    /// Waits for pending device operations to complete.
    ///
    /// Host operations are synchronous, so the default is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if synchronization fails.
    fn synchronize(&self) -> Result<(), TensorError> {
        Ok(())
    }
}

/// Host backend over the system allocator.
#[derive(Clone, Default)]
pub struct CpuBackend;

impl Backend for CpuBackend {
    fn kind(&self) -> DeviceKind {
        DeviceKind::Cpu
    }

    fn alloc(&self, layout: Layout) -> Result<*mut u8, TensorError> {
        // SAFETY: callers guarantee a non-zero layout size.
        let ptr = unsafe { alloc::alloc(layout) };
        if ptr.is_null() {
            return Err(TensorError::AllocationFailed {
                bytes: layout.size(),
            });
        }
        Ok(ptr)
    }

    fn alloc_zeroed(&self, layout: Layout) -> Result<*mut u8, TensorError> {
        // SAFETY: callers guarantee a non-zero layout size.
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        if ptr.is_null() {
            return Err(TensorError::AllocationFailed {
                bytes: layout.size(),
            });
        }
        Ok(ptr)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if !ptr.is_null() {
            alloc::dealloc(ptr, layout);
        }
    }

    unsafe fn copy(
        &self,
        src: *const u8,
        dst: *mut u8,
        len: usize,
        src_device: &Device,
    ) -> Result<(), TensorError> {
        if !src_device.is_cpu() {
            return Err(TensorError::UnsupportedDevice(*src_device));
        }
        std::ptr::copy_nonoverlapping(src, dst, len);
        Ok(())
    }
}

static HOST: CpuBackend = CpuBackend;

/// Resolves the backend serving the given device.
///
/// Every `cpu:N` index maps to the single host backend. Accelerator kinds
/// have no backend compiled in and fail the lookup.
///
/// # Errors
///
/// Returns [`TensorError::UnsupportedDevice`] if no backend serves the
/// device kind.
pub fn backend_for(device: &Device) -> Result<&'static dyn Backend, TensorError> {
    match device.kind() {
        DeviceKind::Cpu => Ok(&HOST),
        DeviceKind::Cuda => Err(TensorError::UnsupportedDevice(*device)),
    }
}
