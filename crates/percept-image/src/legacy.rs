use percept_tensor::{Device, Dtype, Tensor};

use crate::error::ImageError;
use crate::image::Image;

/// Host-only fixed-layout interchange image.
///
/// The layout is row-major with interleaved channels and a fixed byte
/// width per channel value; the pixel bytes live in plain host memory.
/// Pipelines that predate the tensor-backed [`Image`] exchange data in
/// this shape, so the fields are public and the contract is carried by
/// [`Image::from_legacy`] and [`Image::to_legacy`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LegacyImage {
    /// Width of the image in pixels.
    pub width: usize,
    /// Height of the image in pixels.
    pub height: usize,
    /// Number of channels per pixel.
    pub num_channels: usize,
    /// Size of one channel value in bytes.
    pub bytes_per_channel: usize,
    /// Raw pixel bytes, row-major interleaved.
    pub data: Vec<u8>,
}

impl LegacyImage {
    /// Create a zero-filled legacy image with the given layout.
    pub fn prepare(
        width: usize,
        height: usize,
        num_channels: usize,
        bytes_per_channel: usize,
    ) -> Self {
        Self {
            width,
            height,
            num_channels,
            bytes_per_channel,
            data: vec![0; width * height * num_channels * bytes_per_channel],
        }
    }

    /// Number of bytes spanning one row of pixels.
    pub fn bytes_per_line(&self) -> usize {
        self.width * self.num_channels * self.bytes_per_channel
    }

    /// Returns true if the extents are positive and the byte buffer
    /// matches them.
    pub fn has_data(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.data.len() == self.height * self.bytes_per_line()
    }

    /// Returns true if the image holds no usable pixel data.
    pub fn is_empty(&self) -> bool {
        !self.has_data()
    }
}

fn dtype_for_bytes(bytes_per_channel: usize) -> Result<Dtype, ImageError> {
    match bytes_per_channel {
        1 => Ok(Dtype::UInt8),
        2 => Ok(Dtype::UInt16),
        4 => Ok(Dtype::Float32),
        n => Err(ImageError::UnsupportedBytesPerChannel(n)),
    }
}

fn bytes_for_dtype(dtype: Dtype) -> Result<usize, ImageError> {
    match dtype {
        Dtype::UInt8 => Ok(1),
        Dtype::UInt16 => Ok(2),
        Dtype::Float32 => Ok(4),
        dtype => Err(ImageError::UnsupportedDtype {
            op: "to_legacy",
            dtype,
        }),
    }
}

impl Image {
    /// Create an image on `device` by copying pixel data out of a legacy
    /// image.
    ///
    /// The dtype follows the legacy byte width: 1 byte per channel maps
    /// to `UInt8`, 2 to `UInt16` and 4 to `Float32`. A legacy image
    /// without data produces the empty default image on `device`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::UnsupportedBytesPerChannel`] for any other
    /// byte width, and an error from the tensor layer if no backend
    /// serves `device`.
    pub fn from_legacy(legacy: &LegacyImage, device: &Device) -> Result<Image, ImageError> {
        if !legacy.has_data() {
            return Image::new(0, 0, 1, Dtype::Float32, device);
        }

        let dtype = dtype_for_bytes(legacy.bytes_per_channel)?;
        if legacy.num_channels < 1 {
            return Err(ImageError::InvalidShape {
                rows: legacy.height,
                cols: legacy.width,
                channels: legacy.num_channels,
            });
        }

        let host = Tensor::from_bytes(
            &[legacy.height, legacy.width, legacy.num_channels],
            dtype,
            legacy.data.clone(),
            &Device::CPU,
        )?;
        let data = host.to_device(device)?;
        Ok(Image { data })
    }

    /// Convert the image to the legacy interchange layout.
    ///
    /// Accelerator-resident pixel data is transferred to the host first;
    /// this is the only operation that crosses the device boundary
    /// implicitly.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::UnsupportedDtype`] for dtypes the legacy
    /// layout cannot carry; only `UInt8`, `UInt16` and `Float32` images
    /// are representable.
    pub fn to_legacy(&self) -> Result<LegacyImage, ImageError> {
        let bytes_per_channel = bytes_for_dtype(self.dtype())?;

        let data = if self.device().is_cpu() {
            self.as_bytes()?.to_vec()
        } else {
            self.data.to_device(&Device::CPU)?.as_bytes()?.to_vec()
        };

        Ok(LegacyImage {
            width: self.cols(),
            height: self.rows(),
            num_channels: self.channels(),
            bytes_per_channel,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_prepare() {
        let legacy = LegacyImage::prepare(4, 3, 2, 2);
        assert_eq!(legacy.bytes_per_line(), 16);
        assert_eq!(legacy.data.len(), 48);
        assert!(legacy.has_data());
        assert!(!legacy.is_empty());
        assert!(legacy.data.iter().all(|&b| b == 0));
    }

    #[test]
    fn legacy_default_is_empty() {
        let legacy = LegacyImage::default();
        assert!(legacy.is_empty());
        assert!(!legacy.has_data());
    }

    #[test]
    fn from_legacy_u8() -> Result<(), ImageError> {
        let mut legacy = LegacyImage::prepare(2, 1, 3, 1);
        legacy.data.copy_from_slice(&[10, 20, 30, 40, 50, 60]);

        let image = Image::from_legacy(&legacy, &Device::CPU)?;

        assert_eq!(image.rows(), 1);
        assert_eq!(image.cols(), 2);
        assert_eq!(image.channels(), 3);
        assert_eq!(image.dtype(), Dtype::UInt8);
        assert_eq!(image.as_slice::<u8>()?, &[10, 20, 30, 40, 50, 60]);
        Ok(())
    }

    #[test]
    fn from_legacy_dtype_mapping() -> Result<(), ImageError> {
        let u16_image = Image::from_legacy(&LegacyImage::prepare(2, 2, 1, 2), &Device::CPU)?;
        assert_eq!(u16_image.dtype(), Dtype::UInt16);

        let f32_image = Image::from_legacy(&LegacyImage::prepare(2, 2, 1, 4), &Device::CPU)?;
        assert_eq!(f32_image.dtype(), Dtype::Float32);
        Ok(())
    }

    #[test]
    fn from_legacy_unsupported_byte_width() {
        let legacy = LegacyImage::prepare(2, 2, 1, 3);
        let result = Image::from_legacy(&legacy, &Device::CPU);
        assert_eq!(
            result.err(),
            Some(ImageError::UnsupportedBytesPerChannel(3))
        );
    }

    #[test]
    fn from_legacy_without_data() -> Result<(), ImageError> {
        let image = Image::from_legacy(&LegacyImage::default(), &Device::CPU)?;
        assert!(image.is_empty());
        assert_eq!(image.dtype(), Dtype::Float32);
        Ok(())
    }

    #[test]
    fn to_legacy_rejects_f64() -> Result<(), ImageError> {
        let image = Image::new(2, 2, 1, Dtype::Float64, &Device::CPU)?;
        let result = image.to_legacy();
        assert_eq!(
            result.err(),
            Some(ImageError::UnsupportedDtype {
                op: "to_legacy",
                dtype: Dtype::Float64,
            })
        );
        Ok(())
    }

    #[test]
    fn legacy_round_trip_u16_bytes_exact() -> Result<(), ImageError> {
        let mut legacy = LegacyImage::prepare(3, 2, 1, 2);
        for (i, b) in legacy.data.iter_mut().enumerate() {
            *b = i as u8;
        }

        let image = Image::from_legacy(&legacy, &Device::CPU)?;
        let back = image.to_legacy()?;

        assert_eq!(back, legacy);
        Ok(())
    }
}
