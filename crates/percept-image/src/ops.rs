use percept_tensor::{Dtype, Tensor};

use crate::error::ImageError;
use crate::image::Image;
use crate::kernel;

/// Default scale factor applied by [`Image::convert_to`] when none is given.
///
/// Converting an unsigned integer dtype to a float dtype normalizes the
/// full integer range to `[0, 1]`; every other pair keeps values as they
/// are.
pub fn default_scale(src: Dtype, dst: Dtype) -> f64 {
    match (src, dst) {
        (Dtype::UInt8, Dtype::Float32 | Dtype::Float64) => 1.0 / 255.0,
        (Dtype::UInt16, Dtype::Float32 | Dtype::Float64) => 1.0 / 65535.0,
        _ => 1.0,
    }
}

impl Image {
    /// Convert the image to another dtype, applying `out = scale * in + offset`.
    ///
    /// # Arguments
    ///
    /// * `dtype` - The target element type.
    /// * `scale` - The multiplier; `None` selects the default for the
    ///   dtype pair (see [`default_scale`]).
    /// * `offset` - Added after scaling, always applied literally.
    /// * `copy` - When `false` and the resolved conversion is the
    ///   identity, the result shares storage with `self` instead of
    ///   copying. Pass `true` to force a fresh buffer.
    ///
    /// Integer targets round half away from zero and saturate to the
    /// dtype range; float targets cast directly. Shape and device are
    /// preserved.
    ///
    /// # Examples
    ///
    /// ```
    /// use percept_image::Image;
    /// use percept_tensor::{Device, Dtype, Tensor};
    ///
    /// let tensor = Tensor::from_vec(&[1, 2, 1], vec![0u8, 255], &Device::CPU).unwrap();
    /// let image = Image::from_tensor(tensor).unwrap();
    ///
    /// let scaled = image.convert_to(Dtype::Float32, None, 0.0, false).unwrap();
    /// assert_eq!(scaled.as_slice::<f32>().unwrap(), &[0.0, 1.0]);
    /// ```
    pub fn convert_to(
        &self,
        dtype: Dtype,
        scale: Option<f64>,
        offset: f64,
        copy: bool,
    ) -> Result<Image, ImageError> {
        let scale = scale.unwrap_or_else(|| default_scale(self.dtype(), dtype));
        let identity = dtype == self.dtype() && scale == 1.0 && offset == 0.0;
        if identity && !copy {
            return Ok(self.clone());
        }

        let mut dst = Tensor::zeros(self.data.shape(), dtype, &self.device())?;
        if identity {
            dst.copy_from(&self.data)?;
        } else {
            let kernel = kernel::for_device(&self.device())?;
            kernel.affine_cast(&self.data, &mut dst, scale, offset)?;
        }
        Ok(Image { data: dst })
    }

    /// Convert the image to another dtype with the default scale and no
    /// offset.
    pub fn to_dtype(&self, dtype: Dtype) -> Result<Image, ImageError> {
        self.convert_to(dtype, None, 0.0, false)
    }

    /// In-place `image = scale * image + offset` per element, keeping the
    /// dtype. Returns `&mut Self` for chaining.
    ///
    /// This is the only in-place operation. It validates everything
    /// before writing: a shared storage fails with
    /// [`percept_tensor::TensorError::StorageShared`] and leaves the
    /// pixel data untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use percept_image::Image;
    /// use percept_tensor::{Device, Tensor};
    ///
    /// let tensor = Tensor::from_vec(&[1, 2, 1], vec![1.0f32, 2.0], &Device::CPU).unwrap();
    /// let mut image = Image::from_tensor(tensor).unwrap();
    ///
    /// image.linear_transform(2.0, 1.0).unwrap();
    /// assert_eq!(image.as_slice::<f32>().unwrap(), &[3.0, 5.0]);
    /// ```
    pub fn linear_transform(&mut self, scale: f64, offset: f64) -> Result<&mut Self, ImageError> {
        let kernel = kernel::for_device(&self.device())?;
        kernel.affine_inplace(&mut self.data, scale, offset)?;
        Ok(self)
    }
}
