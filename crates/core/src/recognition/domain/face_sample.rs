use image::imageops::FilterType;
use thiserror::Error;

use crate::shared::constants::{SAMPLE_LEN, SAMPLE_SIDE};
use crate::shared::frame::Frame;
use crate::shared::region::FaceRegion;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SampleError {
    #[error("face region {0:?} lies outside the {1}x{2} frame")]
    RegionOutOfBounds(FaceRegion, u32, u32),
    #[error("sample must have {expected} pixels, got {actual}")]
    WrongLength { expected: usize, actual: usize },
}

/// A normalized face: 50x50 grayscale, flattened row-major to 2500 values
/// in `[0, 255]`.
///
/// This is the only input identity classifiers accept, so every classifier
/// sees the same crop/resize/flatten treatment.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceSample {
    pixels: Vec<f32>,
}

impl FaceSample {
    pub fn from_pixels(pixels: Vec<f32>) -> Result<Self, SampleError> {
        if pixels.len() != SAMPLE_LEN {
            return Err(SampleError::WrongLength {
                expected: SAMPLE_LEN,
                actual: pixels.len(),
            });
        }
        Ok(Self { pixels })
    }

    /// Crop `region` out of `frame`, convert to grayscale, resize to
    /// 50x50 (bilinear) and flatten.
    pub fn from_frame(frame: &Frame, region: &FaceRegion) -> Result<Self, SampleError> {
        let crop = frame.crop(region).ok_or(SampleError::RegionOutOfBounds(
            *region,
            frame.width(),
            frame.height(),
        ))?;
        let gray = crop.to_grayscale();
        let img = image::GrayImage::from_raw(gray.width(), gray.height(), gray.data().to_vec())
            .ok_or(SampleError::RegionOutOfBounds(
                *region,
                frame.width(),
                frame.height(),
            ))?;
        Ok(Self::from_gray_image(&img))
    }

    /// Normalize an already-grayscale image of any size.
    pub fn from_gray_image(img: &image::GrayImage) -> Self {
        let resized = if img.dimensions() == (SAMPLE_SIDE, SAMPLE_SIDE) {
            img.clone()
        } else {
            image::imageops::resize(img, SAMPLE_SIDE, SAMPLE_SIDE, FilterType::Triangle)
        };
        Self {
            pixels: resized.into_raw().into_iter().map(f32::from).collect(),
        }
    }

    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    /// `[1, 2500]` batch tensor for model input.
    pub fn to_ndarray(&self) -> ndarray::Array2<f32> {
        ndarray::Array1::from(self.pixels.clone()).insert_axis(ndarray::Axis(0))
    }

    pub fn squared_distance(&self, other: &FaceSample) -> f32 {
        self.pixels
            .iter()
            .zip(other.pixels.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn uniform(value: f32) -> FaceSample {
        FaceSample::from_pixels(vec![value; SAMPLE_LEN]).unwrap()
    }

    #[test]
    fn test_from_pixels_rejects_wrong_length() {
        let err = FaceSample::from_pixels(vec![0.0; 10]).unwrap_err();
        assert_eq!(
            err,
            SampleError::WrongLength {
                expected: 2500,
                actual: 10
            }
        );
    }

    #[test]
    fn test_from_frame_produces_fixed_size_grayscale() {
        // 200x100 RGB frame, pure green
        let data = (0..200 * 100).flat_map(|_| [0u8, 255, 0]).collect();
        let frame = Frame::new(data, 200, 100, 3, 0);
        let region = FaceRegion {
            x: 20,
            y: 10,
            width: 80,
            height: 60,
        };

        let sample = FaceSample::from_frame(&frame, &region).unwrap();
        assert_eq!(sample.pixels().len(), SAMPLE_LEN);
        assert!(sample.pixels().iter().all(|&p| (p - 150.0).abs() <= 1.0));
    }

    #[test]
    fn test_from_frame_uses_only_region_pixels() {
        // left half black, right half white; sample the right half only
        let data = (0..100)
            .flat_map(|_| (0..100).map(|x| if x < 50 { 0u8 } else { 255u8 }))
            .collect();
        let frame = Frame::new(data, 100, 100, 1, 0);
        let region = FaceRegion {
            x: 50,
            y: 0,
            width: 50,
            height: 50,
        };

        let sample = FaceSample::from_frame(&frame, &region).unwrap();
        assert!(sample.pixels().iter().all(|&p| p >= 254.0));
    }

    #[test]
    fn test_from_frame_rejects_out_of_bounds_region() {
        let frame = Frame::new(vec![0u8; 40 * 40], 40, 40, 1, 0);
        let region = FaceRegion {
            x: 30,
            y: 30,
            width: 20,
            height: 20,
        };
        assert!(matches!(
            FaceSample::from_frame(&frame, &region),
            Err(SampleError::RegionOutOfBounds(..))
        ));
    }

    #[test]
    fn test_to_ndarray_is_single_row_batch() {
        let arr = uniform(3.0).to_ndarray();
        assert_eq!(arr.shape(), &[1, SAMPLE_LEN]);
        assert_relative_eq!(arr[[0, 42]], 3.0);
    }

    #[test]
    fn test_squared_distance() {
        assert_relative_eq!(uniform(1.0).squared_distance(&uniform(1.0)), 0.0);
        assert_relative_eq!(
            uniform(0.0).squared_distance(&uniform(2.0)),
            4.0 * SAMPLE_LEN as f32
        );
    }
}
