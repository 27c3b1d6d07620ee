use percept_tensor::Tensor;

use crate::error::ImageError;
use crate::image::Image;
use crate::kernel;

/// Define the RGB weights for the grayscale conversion.
pub(crate) const RW: f64 = 0.299;
pub(crate) const GW: f64 = 0.587;
pub(crate) const BW: f64 = 0.114;

/// Specifies whether R, G, B channels have the same weight when converting
/// to intensity. Only used for images with 3 channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorConversion {
    /// R, G, B channels have equal weights: `gray = (R + G + B) / 3`.
    RgbToGrayEqual,
    /// R, G, B channels are weighted according to the Digital ITU BT.601
    /// standard: `gray = 0.299 * R + 0.587 * G + 0.114 * B`.
    RgbToGrayWeighted,
}

impl Image {
    /// Convert a 3-channel RGB image to a single-channel grayscale image.
    ///
    /// The per-pixel sum is accumulated in `f64` and written back in the
    /// source dtype; integer dtypes round half away from zero rather than
    /// truncating, so the conversion carries no systematic brightness
    /// bias. Rows, cols, dtype and device are preserved.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidChannelCount`] unless the image has
    /// exactly 3 channels.
    ///
    /// # Examples
    ///
    /// ```
    /// use percept_image::{ColorConversion, Image};
    /// use percept_tensor::{Device, Tensor};
    ///
    /// let tensor = Tensor::from_vec(&[1, 1, 3], vec![90u8, 120, 150], &Device::CPU).unwrap();
    /// let image = Image::from_tensor(tensor).unwrap();
    ///
    /// let gray = image.convert_color(ColorConversion::RgbToGrayEqual).unwrap();
    /// assert_eq!(gray.channels(), 1);
    /// assert_eq!(gray.as_slice::<u8>().unwrap(), &[120]);
    /// ```
    pub fn convert_color(&self, conversion: ColorConversion) -> Result<Image, ImageError> {
        if self.channels() != 3 {
            return Err(ImageError::InvalidChannelCount {
                expected: 3,
                actual: self.channels(),
            });
        }

        let mut dst = Tensor::zeros(&[self.rows(), self.cols(), 1], self.dtype(), &self.device())?;
        let kernel = kernel::for_device(&self.device())?;
        kernel.gray_reduce(&self.data, &mut dst, conversion)?;
        Ok(Image { data: dst })
    }
}
