use percept_tensor::{Device, DeviceKind, Tensor, TensorError};

use crate::color::ColorConversion;
use crate::error::ImageError;

mod host;

pub use host::HostKernel;

/// Device-specific execution strategy for the image kernels.
///
/// Each logical operation exists once; an implementation of this trait
/// supplies its execution strategy for one device kind. Callers resolve
/// the strategy from the tensor's device with [`for_device`] and never
/// branch on the device themselves.
///
/// All methods operate on rank-3 `(rows, cols, channels)` tensors and
/// validate shapes, dtypes and device placement before touching any
/// element, so a returned error implies nothing was written.
pub trait ImageKernel: Send + Sync {
    /// Elementwise `dst = scale * src + offset`, casting into the dtype
    /// of `dst`. Integer write-back rounds half away from zero and
    /// saturates to the target range; float write-back casts directly.
    fn affine_cast(
        &self,
        src: &Tensor,
        dst: &mut Tensor,
        scale: f64,
        offset: f64,
    ) -> Result<(), ImageError>;

    /// Elementwise in-place `data = scale * data + offset`, keeping the
    /// dtype. The same rounding and saturation rules as
    /// [`ImageKernel::affine_cast`] apply.
    fn affine_inplace(&self, data: &mut Tensor, scale: f64, offset: f64)
        -> Result<(), ImageError>;

    /// Reduce a 3-channel tensor to a single channel according to
    /// `conversion`. The accumulation runs in `f64` and is written back
    /// in the source dtype.
    fn gray_reduce(
        &self,
        src: &Tensor,
        dst: &mut Tensor,
        conversion: ColorConversion,
    ) -> Result<(), ImageError>;

    /// Per-channel maximum over a `(2 * half_size + 1)` square window
    /// centered on each pixel. Window cells outside the image are
    /// ignored; the window always contains the center pixel.
    fn window_max(
        &self,
        src: &Tensor,
        dst: &mut Tensor,
        half_size: usize,
    ) -> Result<(), ImageError>;
}

static HOST: HostKernel = HostKernel;

/// Resolve the kernel strategy serving `device`.
///
/// Every `cpu:N` device resolves to the shared host strategy. Accelerator
/// devices have no strategy compiled in and report
/// [`TensorError::UnsupportedDevice`].
pub fn for_device(device: &Device) -> Result<&'static dyn ImageKernel, ImageError> {
    match device.kind() {
        DeviceKind::Cpu => Ok(&HOST),
        DeviceKind::Cuda => Err(TensorError::UnsupportedDevice(*device).into()),
    }
}

pub(crate) fn same_device(src: &Tensor, dst: &Tensor) -> Result<(), TensorError> {
    if src.device() != dst.device() {
        return Err(TensorError::DeviceMismatch {
            expected: src.device(),
            actual: dst.device(),
        });
    }
    Ok(())
}
