use percept_tensor::{dispatch_dtype, Device, Dtype, Element, Scalar, Tensor, TensorError};

use crate::error::ImageError;

/// Represents an image with pixel data.
///
/// The image owns exactly one rank-3 [`Tensor`] with shape
/// `(rows, cols, channels)` in row-major interleaved layout. The dtype and
/// device of the image are the dtype and device of that tensor; the image
/// stores no copies of them, so they can never diverge.
///
/// Cloning an image is cheap: the underlying storage is reference counted
/// and shared. In-place mutation of shared storage is rejected by the
/// tensor layer with [`TensorError::StorageShared`].
///
/// # Examples
///
/// ```
/// use percept_image::Image;
/// use percept_tensor::{Device, Dtype};
///
/// let image = Image::new(20, 10, 3, Dtype::UInt8, &Device::CPU).unwrap();
///
/// assert_eq!(image.rows(), 20);
/// assert_eq!(image.cols(), 10);
/// assert_eq!(image.channels(), 3);
/// assert_eq!(image.dtype(), Dtype::UInt8);
/// ```
#[derive(Clone, Debug)]
pub struct Image {
    pub(crate) data: Tensor,
}

impl Image {
    /// Create a new zero-filled image.
    ///
    /// # Arguments
    ///
    /// * `rows` - The height of the image in pixels.
    /// * `cols` - The width of the image in pixels.
    /// * `channels` - The number of channels per pixel. Must be at least 1.
    /// * `dtype` - The element type of the pixel data.
    /// * `device` - The device the pixel data lives on.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidShape`] if `channels` is zero, or an
    /// error from the tensor layer if no backend serves `device`.
    pub fn new(
        rows: usize,
        cols: usize,
        channels: usize,
        dtype: Dtype,
        device: &Device,
    ) -> Result<Self, ImageError> {
        if channels < 1 {
            return Err(ImageError::InvalidShape {
                rows,
                cols,
                channels,
            });
        }
        let data = Tensor::zeros(&[rows, cols, channels], dtype, device)?;
        Ok(Self { data })
    }

    /// Wrap an existing tensor as an image without copying.
    ///
    /// The tensor must be row-major contiguous and of rank 2 or 3. A rank-2
    /// tensor is treated as a single-channel image and reshaped to
    /// `(rows, cols, 1)`; the reshape shares storage, so no pixel data
    /// moves.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::NotContiguous`] for non-contiguous tensors,
    /// [`ImageError::InvalidRank`] for ranks other than 2 or 3, and
    /// [`ImageError::InvalidShape`] for a rank-3 tensor with zero channels.
    ///
    /// # Examples
    ///
    /// ```
    /// use percept_image::Image;
    /// use percept_tensor::{Device, Tensor};
    ///
    /// let tensor = Tensor::from_vec(&[2, 3], vec![0u8; 6], &Device::CPU).unwrap();
    /// let image = Image::from_tensor(tensor).unwrap();
    ///
    /// assert_eq!(image.rows(), 2);
    /// assert_eq!(image.cols(), 3);
    /// assert_eq!(image.channels(), 1);
    /// ```
    pub fn from_tensor(data: Tensor) -> Result<Self, ImageError> {
        if !data.is_contiguous() {
            return Err(TensorError::NotContiguous.into());
        }
        let data = match data.rank() {
            2 => {
                let shape = [data.shape()[0], data.shape()[1], 1];
                data.reshape(&shape)?
            }
            3 => data,
            rank => return Err(ImageError::InvalidRank(rank)),
        };
        if data.shape()[2] < 1 {
            return Err(ImageError::InvalidShape {
                rows: data.shape()[0],
                cols: data.shape()[1],
                channels: data.shape()[2],
            });
        }
        Ok(Self { data })
    }

    /// Get the number of rows (height) of the image.
    pub fn rows(&self) -> usize {
        self.data.shape()[0]
    }

    /// Get the number of columns (width) of the image.
    pub fn cols(&self) -> usize {
        self.data.shape()[1]
    }

    /// Get the number of channels per pixel.
    pub fn channels(&self) -> usize {
        self.data.shape()[2]
    }

    /// Get the spatial extents of the image as `[rows, cols]`.
    pub fn size(&self) -> [usize; 2] {
        [self.rows(), self.cols()]
    }

    /// Get the element type of the pixel data.
    pub fn dtype(&self) -> Dtype {
        self.data.dtype()
    }

    /// Get the device the pixel data lives on.
    pub fn device(&self) -> Device {
        self.data.device()
    }

    /// Returns true if the image holds no pixel data.
    pub fn is_empty(&self) -> bool {
        self.data.numel() == 0
    }

    /// Drop the pixel data, resizing the image to `0 x 0`.
    ///
    /// The channel count, dtype and device are preserved so the image can
    /// be refilled later with the same layout.
    pub fn clear(&mut self) -> &mut Self {
        self.data = Tensor::empty(&[0, 0, self.channels()], self.dtype(), &self.device());
        self
    }

    /// Minimal spatial coordinate covered by the image, always `[0, 0]`.
    pub fn min_bound(&self) -> [usize; 2] {
        [0, 0]
    }

    /// One past the maximal spatial coordinate, `[rows, cols]`.
    pub fn max_bound(&self) -> [usize; 2] {
        [self.rows(), self.cols()]
    }

    /// Borrow the underlying tensor.
    pub fn as_tensor(&self) -> &Tensor {
        &self.data
    }

    /// Consume the image and return the underlying tensor.
    pub fn into_tensor(self) -> Tensor {
        self.data
    }

    /// Get the pixel data as a typed host slice.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::TypeMismatch`] if `T` does not match the
    /// image dtype, or a device error if the data is not host resident.
    pub fn as_slice<T: Element>(&self) -> Result<&[T], ImageError> {
        Ok(self.data.as_slice::<T>()?)
    }

    /// Get the pixel data as a mutable typed host slice.
    ///
    /// Fails with [`TensorError::StorageShared`] while another image or
    /// tensor shares the storage.
    pub fn as_slice_mut<T: Element>(&mut self) -> Result<&mut [T], ImageError> {
        Ok(self.data.as_slice_mut::<T>()?)
    }

    /// Get the raw pixel bytes of a host image.
    pub fn as_bytes(&self) -> Result<&[u8], ImageError> {
        Ok(self.data.as_bytes()?)
    }

    /// Get the channel values of one pixel as a typed slice view.
    ///
    /// # Panics
    ///
    /// Panics if `r` or `c` is out of bounds; spatial indexing faults are
    /// the buffer's responsibility, not a recoverable condition.
    ///
    /// # Examples
    ///
    /// ```
    /// use percept_image::Image;
    /// use percept_tensor::{Device, Tensor};
    ///
    /// let tensor = Tensor::from_vec(&[2, 1, 3], vec![0u8, 1, 2, 3, 4, 5], &Device::CPU).unwrap();
    /// let image = Image::from_tensor(tensor).unwrap();
    ///
    /// assert_eq!(image.at::<u8>(1, 0).unwrap(), &[3, 4, 5]);
    /// ```
    pub fn at<T: Element>(&self, r: usize, c: usize) -> Result<&[T], ImageError> {
        let offset = self.data.offset_of(&[r, c, 0]);
        let channels = self.channels();
        let slice = self.data.as_slice::<T>()?;
        Ok(&slice[offset..offset + channels])
    }

    /// Get the channel values of one pixel as a mutable typed slice view.
    ///
    /// Writing through the returned slice mutates the image directly.
    ///
    /// # Panics
    ///
    /// Panics if `r` or `c` is out of bounds.
    pub fn at_mut<T: Element>(&mut self, r: usize, c: usize) -> Result<&mut [T], ImageError> {
        let offset = self.data.offset_of(&[r, c, 0]);
        let channels = self.channels();
        let slice = self.data.as_slice_mut::<T>()?;
        Ok(&mut slice[offset..offset + channels])
    }

    /// Read a single element as a runtime-typed [`Scalar`].
    ///
    /// # Panics
    ///
    /// Panics if `r`, `c` or `ch` is out of bounds.
    pub fn scalar(&self, r: usize, c: usize, ch: usize) -> Result<Scalar, ImageError> {
        let offset = self.data.offset_of(&[r, c, ch]);
        dispatch_dtype!(self.dtype(), |T| {
            let slice = self.data.as_slice::<T>()?;
            Ok(Scalar::from(slice[offset]))
        })
    }
}

impl TryFrom<Tensor> for Image {
    type Error = ImageError;

    fn try_from(data: Tensor) -> Result<Self, Self::Error> {
        Self::from_tensor(data)
    }
}

impl Default for Image {
    /// An empty single-channel `Float32` image on `cpu:0`.
    fn default() -> Self {
        Self {
            data: Tensor::empty(&[0, 0, 1], Dtype::Float32, &Device::CPU),
        }
    }
}

impl std::fmt::Display for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Image[{}x{}x{}, {}, {}]",
            self.rows(),
            self.cols(),
            self.channels(),
            self.dtype(),
            self.device()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_smoke() -> Result<(), ImageError> {
        let image = Image::new(20, 10, 3, Dtype::UInt8, &Device::CPU)?;
        assert_eq!(image.rows(), 20);
        assert_eq!(image.cols(), 10);
        assert_eq!(image.channels(), 3);
        assert_eq!(image.size(), [20, 10]);
        assert_eq!(image.dtype(), Dtype::UInt8);
        assert_eq!(image.device(), Device::CPU);
        assert!(!image.is_empty());
        assert!(image.as_slice::<u8>()?.iter().all(|&v| v == 0));
        Ok(())
    }

    #[test]
    fn image_zero_channels() {
        let result = Image::new(10, 10, 0, Dtype::UInt8, &Device::CPU);
        assert_eq!(
            result.err(),
            Some(ImageError::InvalidShape {
                rows: 10,
                cols: 10,
                channels: 0
            })
        );
    }

    #[test]
    fn image_from_tensor_shares_storage() -> Result<(), ImageError> {
        let tensor = Tensor::from_vec(&[2, 1, 3], vec![0u8, 1, 2, 3, 4, 5], &Device::CPU)?;
        let image = Image::from_tensor(tensor.clone())?;
        assert!(image.as_tensor().ptr_eq(&tensor));
        assert_eq!(image.channels(), 3);
        Ok(())
    }

    #[test]
    fn image_from_rank2_tensor() -> Result<(), ImageError> {
        let tensor = Tensor::from_vec(&[2, 3], vec![0.0f32; 6], &Device::CPU)?;
        let image = Image::from_tensor(tensor.clone())?;
        assert_eq!(image.rows(), 2);
        assert_eq!(image.cols(), 3);
        assert_eq!(image.channels(), 1);
        assert!(image.as_tensor().ptr_eq(&tensor));
        Ok(())
    }

    #[test]
    fn image_from_tensor_invalid_rank() -> Result<(), ImageError> {
        let tensor = Tensor::from_vec(&[2, 3, 1, 1], vec![0u8; 6], &Device::CPU)?;
        let result = Image::from_tensor(tensor);
        assert_eq!(result.err(), Some(ImageError::InvalidRank(4)));
        Ok(())
    }

    #[test]
    fn image_from_non_contiguous_tensor() -> Result<(), ImageError> {
        let tensor = Tensor::from_vec(&[2, 3, 1], vec![0u8; 6], &Device::CPU)?;
        let transposed = tensor.permute(&[1, 0, 2])?;
        let result = Image::from_tensor(transposed);
        assert_eq!(
            result.err(),
            Some(ImageError::Tensor(TensorError::NotContiguous))
        );
        Ok(())
    }

    #[test]
    fn image_clear_preserves_layout() -> Result<(), ImageError> {
        let mut image = Image::new(4, 5, 3, Dtype::UInt16, &Device::cpu(1))?;
        image.clear();
        assert_eq!(image.rows(), 0);
        assert_eq!(image.cols(), 0);
        assert_eq!(image.channels(), 3);
        assert_eq!(image.dtype(), Dtype::UInt16);
        assert_eq!(image.device(), Device::cpu(1));
        assert!(image.is_empty());
        Ok(())
    }

    #[test]
    fn image_at_and_at_mut() -> Result<(), ImageError> {
        let tensor = Tensor::from_vec(&[2, 2, 2], vec![0u16, 1, 2, 3, 4, 5, 6, 7], &Device::CPU)?;
        let mut image = Image::from_tensor(tensor)?;
        assert_eq!(image.at::<u16>(1, 0)?, &[4, 5]);

        image.at_mut::<u16>(1, 0)?[1] = 99;
        assert_eq!(image.at::<u16>(1, 0)?, &[4, 99]);
        Ok(())
    }

    #[test]
    fn image_at_type_mismatch() -> Result<(), ImageError> {
        let image = Image::new(2, 2, 1, Dtype::Float32, &Device::CPU)?;
        let result = image.at::<u8>(0, 0);
        assert_eq!(
            result.err(),
            Some(ImageError::Tensor(TensorError::TypeMismatch {
                expected: Dtype::Float32,
                actual: Dtype::UInt8,
            }))
        );
        Ok(())
    }

    #[test]
    #[should_panic]
    fn image_at_out_of_bounds() {
        let image = Image::new(2, 2, 1, Dtype::UInt8, &Device::CPU).unwrap();
        let _ = image.at::<u8>(2, 0);
    }

    #[test]
    fn image_scalar() -> Result<(), ImageError> {
        let tensor = Tensor::from_vec(&[1, 2, 3], vec![0u8, 1, 2, 3, 4, 5], &Device::CPU)?;
        let image = Image::from_tensor(tensor)?;
        assert_eq!(image.scalar(0, 1, 2)?, Scalar::UInt8(5));
        Ok(())
    }

    #[test]
    fn image_bounds() -> Result<(), ImageError> {
        let image = Image::new(3, 7, 1, Dtype::Float64, &Device::CPU)?;
        assert_eq!(image.min_bound(), [0, 0]);
        assert_eq!(image.max_bound(), [3, 7]);
        Ok(())
    }

    #[test]
    fn image_default() {
        let image = Image::default();
        assert!(image.is_empty());
        assert_eq!(image.channels(), 1);
        assert_eq!(image.dtype(), Dtype::Float32);
        assert_eq!(image.device(), Device::CPU);
    }

    #[test]
    fn image_display() -> Result<(), ImageError> {
        let image = Image::new(2, 4, 3, Dtype::UInt8, &Device::CPU)?;
        assert_eq!(format!("{}", image), "Image[2x4x3, uint8, cpu:0]");
        Ok(())
    }

    #[test]
    fn image_clone_shares_storage() -> Result<(), ImageError> {
        let image = Image::new(2, 2, 1, Dtype::UInt8, &Device::CPU)?;
        let copy = image.clone();
        assert!(copy.as_tensor().ptr_eq(image.as_tensor()));
        Ok(())
    }
}
