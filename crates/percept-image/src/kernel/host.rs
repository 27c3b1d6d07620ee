use rayon::prelude::*;

use percept_tensor::{dispatch_dtype, Element, Tensor, TensorError};

use crate::color::{ColorConversion, BW, GW, RW};
use crate::error::ImageError;

use super::{same_device, ImageKernel};

/// Row-parallel kernel strategy over host memory.
///
/// One shared instance serves every `cpu:N` device; the kernels split the
/// pixel data into rows and process them on the global rayon pool.
#[derive(Clone, Copy, Default)]
pub struct HostKernel;

fn check_rank3(t: &Tensor) -> Result<(), ImageError> {
    if t.rank() != 3 {
        return Err(ImageError::InvalidRank(t.rank()));
    }
    Ok(())
}

impl ImageKernel for HostKernel {
    fn affine_cast(
        &self,
        src: &Tensor,
        dst: &mut Tensor,
        scale: f64,
        offset: f64,
    ) -> Result<(), ImageError> {
        same_device(src, dst)?;
        check_rank3(src)?;
        if src.shape() != dst.shape() {
            return Err(TensorError::ShapeMismatch {
                expected: dst.shape().to_vec(),
                actual: src.shape().to_vec(),
            }
            .into());
        }
        if src.numel() == 0 {
            return Ok(());
        }

        let row_stride = src.shape()[1] * src.shape()[2];
        dispatch_dtype!(src.dtype(), |S| {
            dispatch_dtype!(dst.dtype(), |D| {
                let src_slice = src.as_slice::<S>()?;
                let dst_slice = dst.as_slice_mut::<D>()?;
                src_slice
                    .par_chunks_exact(row_stride)
                    .zip(dst_slice.par_chunks_exact_mut(row_stride))
                    .for_each(|(src_row, dst_row)| {
                        src_row.iter().zip(dst_row.iter_mut()).for_each(|(s, d)| {
                            *d = D::from_f64(scale * s.to_f64() + offset);
                        });
                    });
                Ok(())
            })
        })
    }

    fn affine_inplace(
        &self,
        data: &mut Tensor,
        scale: f64,
        offset: f64,
    ) -> Result<(), ImageError> {
        check_rank3(data)?;
        if data.numel() == 0 {
            return Ok(());
        }

        dispatch_dtype!(data.dtype(), |T| {
            let slice = data.as_slice_mut::<T>()?;
            slice.par_iter_mut().for_each(|v| {
                *v = T::from_f64(scale * v.to_f64() + offset);
            });
            Ok(())
        })
    }

    fn gray_reduce(
        &self,
        src: &Tensor,
        dst: &mut Tensor,
        conversion: ColorConversion,
    ) -> Result<(), ImageError> {
        same_device(src, dst)?;
        check_rank3(src)?;
        check_rank3(dst)?;
        if src.shape()[2] != 3 {
            return Err(ImageError::InvalidChannelCount {
                expected: 3,
                actual: src.shape()[2],
            });
        }
        if dst.shape()[2] != 1 {
            return Err(ImageError::InvalidChannelCount {
                expected: 1,
                actual: dst.shape()[2],
            });
        }
        if src.shape()[..2] != dst.shape()[..2] {
            return Err(TensorError::ShapeMismatch {
                expected: dst.shape().to_vec(),
                actual: src.shape().to_vec(),
            }
            .into());
        }
        if src.dtype() != dst.dtype() {
            return Err(TensorError::TypeMismatch {
                expected: dst.dtype(),
                actual: src.dtype(),
            }
            .into());
        }
        if src.numel() == 0 {
            return Ok(());
        }

        let cols = src.shape()[1];
        dispatch_dtype!(src.dtype(), |T| {
            let src_slice = src.as_slice::<T>()?;
            let dst_slice = dst.as_slice_mut::<T>()?;
            src_slice
                .par_chunks_exact(cols * 3)
                .zip(dst_slice.par_chunks_exact_mut(cols))
                .for_each(|(src_row, dst_row)| {
                    src_row
                        .chunks_exact(3)
                        .zip(dst_row.iter_mut())
                        .for_each(|(src_pixel, dst_pixel)| {
                            let y = match conversion {
                                ColorConversion::RgbToGrayEqual => {
                                    (src_pixel[0].to_f64()
                                        + src_pixel[1].to_f64()
                                        + src_pixel[2].to_f64())
                                        / 3.0
                                }
                                ColorConversion::RgbToGrayWeighted => {
                                    RW * src_pixel[0].to_f64()
                                        + GW * src_pixel[1].to_f64()
                                        + BW * src_pixel[2].to_f64()
                                }
                            };
                            *dst_pixel = T::from_f64(y);
                        });
                });
            Ok(())
        })
    }

    fn window_max(
        &self,
        src: &Tensor,
        dst: &mut Tensor,
        half_size: usize,
    ) -> Result<(), ImageError> {
        same_device(src, dst)?;
        check_rank3(src)?;
        if src.shape() != dst.shape() {
            return Err(TensorError::ShapeMismatch {
                expected: dst.shape().to_vec(),
                actual: src.shape().to_vec(),
            }
            .into());
        }
        if src.dtype() != dst.dtype() {
            return Err(TensorError::TypeMismatch {
                expected: dst.dtype(),
                actual: src.dtype(),
            }
            .into());
        }
        if src.numel() == 0 {
            return Ok(());
        }

        let rows = src.shape()[0];
        let cols = src.shape()[1];
        let channels = src.shape()[2];
        dispatch_dtype!(src.dtype(), |T| {
            let src_slice = src.as_slice::<T>()?;
            let dst_slice = dst.as_slice_mut::<T>()?;
            dst_slice
                .par_chunks_exact_mut(cols * channels)
                .enumerate()
                .for_each(|(r, dst_row)| {
                    let r0 = r.saturating_sub(half_size);
                    let r1 = r.saturating_add(half_size).min(rows - 1);
                    for c in 0..cols {
                        let c0 = c.saturating_sub(half_size);
                        let c1 = c.saturating_add(half_size).min(cols - 1);
                        for ch in 0..channels {
                            // seed with the center pixel; the window always contains it
                            let mut max_val = src_slice[(r * cols + c) * channels + ch];
                            for rr in r0..=r1 {
                                for cc in c0..=c1 {
                                    let v = src_slice[(rr * cols + cc) * channels + ch];
                                    if v > max_val {
                                        max_val = v;
                                    }
                                }
                            }
                            dst_row[c * channels + ch] = max_val;
                        }
                    }
                });
            Ok(())
        })
    }
}
