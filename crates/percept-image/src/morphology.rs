use percept_tensor::Tensor;

use crate::error::ImageError;
use crate::image::Image;
use crate::kernel;

impl Image {
    /// Dilate the image, replacing each element by the per-channel
    /// maximum over a square window of edge length
    /// `2 * half_kernel_size + 1` centered on the pixel.
    ///
    /// Window cells falling outside the image are ignored: the maximum is
    /// taken over the in-bounds part of the window, which always contains
    /// the center pixel, so border pixels are well-defined and no zero
    /// bias is introduced for signed or float data. A `half_kernel_size`
    /// of 0 copies the image unchanged.
    ///
    /// The result is always a fresh buffer with the same shape, dtype and
    /// device as the input.
    ///
    /// # Examples
    ///
    /// ```
    /// use percept_image::Image;
    /// use percept_tensor::{Device, Tensor};
    ///
    /// #[rustfmt::skip]
    /// let tensor = Tensor::from_vec(
    ///     &[3, 3, 1],
    ///     vec![
    ///         0u8, 0, 0,
    ///         0, 1, 0,
    ///         0, 0, 0,
    ///     ],
    ///     &Device::CPU,
    /// ).unwrap();
    /// let mask = Image::from_tensor(tensor).unwrap();
    ///
    /// let dilated = mask.dilate(1).unwrap();
    /// assert!(dilated.as_slice::<u8>().unwrap().iter().all(|&v| v == 1));
    /// ```
    pub fn dilate(&self, half_kernel_size: usize) -> Result<Image, ImageError> {
        let mut dst = Tensor::zeros(self.data.shape(), self.dtype(), &self.device())?;
        let kernel = kernel::for_device(&self.device())?;
        kernel.window_max(&self.data, &mut dst, half_kernel_size)?;
        Ok(Image { data: dst })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use percept_tensor::Device;

    fn mask_5x5(on: &[(usize, usize)]) -> Result<Image, ImageError> {
        let mut data = vec![0u8; 5 * 5];
        for &(r, c) in on {
            data[r * 5 + c] = 1;
        }
        let tensor = Tensor::from_vec(&[5, 5, 1], data, &Device::CPU)?;
        Image::from_tensor(tensor)
    }

    #[test]
    fn dilate_single_pixel_to_block() -> Result<(), ImageError> {
        let mask = mask_5x5(&[(2, 2)])?;

        let dilated = mask.dilate(1)?;

        #[rustfmt::skip]
        let expected = vec![
            0u8, 0, 0, 0, 0,
            0, 1, 1, 1, 0,
            0, 1, 1, 1, 0,
            0, 1, 1, 1, 0,
            0, 0, 0, 0, 0,
        ];
        assert_eq!(dilated.as_slice::<u8>()?, expected.as_slice());
        Ok(())
    }

    #[test]
    fn dilate_zero_is_identity() -> Result<(), ImageError> {
        let mask = mask_5x5(&[(0, 0), (3, 4)])?;

        let dilated = mask.dilate(0)?;

        assert_eq!(dilated.as_slice::<u8>()?, mask.as_slice::<u8>()?);
        // always a fresh buffer, never an alias
        assert!(!dilated.as_tensor().ptr_eq(mask.as_tensor()));
        Ok(())
    }

    #[test]
    fn dilate_clips_at_border() -> Result<(), ImageError> {
        let mask = mask_5x5(&[(0, 0)])?;

        let dilated = mask.dilate(1)?;

        #[rustfmt::skip]
        let expected = vec![
            1u8, 1, 0, 0, 0,
            1, 1, 0, 0, 0,
            0, 0, 0, 0, 0,
            0, 0, 0, 0, 0,
            0, 0, 0, 0, 0,
        ];
        assert_eq!(dilated.as_slice::<u8>()?, expected.as_slice());
        Ok(())
    }

    #[test]
    fn dilate_window_spans_image() -> Result<(), ImageError> {
        let mask = mask_5x5(&[(4, 4)])?;

        // a 9x9 window covers the whole 5x5 image from every pixel
        let dilated = mask.dilate(4)?;

        assert!(dilated.as_slice::<u8>()?.iter().all(|&v| v == 1));
        Ok(())
    }

    #[test]
    fn dilate_channels_independent() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let tensor = Tensor::from_vec(
            &[1, 3, 2],
            vec![
                5u8, 0,
                0, 7,
                0, 0,
            ],
            &Device::CPU,
        )?;
        let image = Image::from_tensor(tensor)?;

        let dilated = image.dilate(1)?;

        #[rustfmt::skip]
        let expected = vec![
            5u8, 7,
            5, 7,
            0, 7,
        ];
        assert_eq!(dilated.as_slice::<u8>()?, expected.as_slice());
        Ok(())
    }

    #[test]
    fn dilate_float_data() -> Result<(), ImageError> {
        let tensor = Tensor::from_vec(&[1, 3, 1], vec![-1.5f32, -0.5, -2.0], &Device::CPU)?;
        let image = Image::from_tensor(tensor)?;

        let dilated = image.dilate(1)?;

        // ignoring out-of-bounds cells keeps negative data unbiased
        assert_eq!(dilated.as_slice::<f32>()?, &[-0.5, -0.5, -0.5]);
        Ok(())
    }
}
