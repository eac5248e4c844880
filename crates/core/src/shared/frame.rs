use ndarray::{ArrayView3, ArrayViewMut3};

use crate::shared::region::FaceRegion;

/// A single captured frame: contiguous pixel bytes in row-major order.
///
/// Color frames are RGB (3 channels); grayscale frames have 1 channel.
/// Format conversion happens at capture boundaries only.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Whether `region` lies entirely inside the frame.
    pub fn contains(&self, region: &FaceRegion) -> bool {
        region.width > 0
            && region.height > 0
            && region.x.saturating_add(region.width) <= self.width
            && region.y.saturating_add(region.height) <= self.height
    }

    /// Copies the pixels under `region` into a new frame with the same
    /// channel count and frame index.
    ///
    /// Returns `None` when the region does not fit inside the frame.
    pub fn crop(&self, region: &FaceRegion) -> Option<Frame> {
        if !self.contains(region) {
            return None;
        }
        let ch = self.channels as usize;
        let row_len = region.width as usize * ch;
        let mut data = Vec::with_capacity(row_len * region.height as usize);
        for row in region.y..region.y + region.height {
            let start = (row as usize * self.width as usize + region.x as usize) * ch;
            data.extend_from_slice(&self.data[start..start + row_len]);
        }
        Some(Frame::new(
            data,
            region.width,
            region.height,
            self.channels,
            self.index,
        ))
    }

    /// Single-channel copy using ITU-R BT.601 luma weights
    /// (`0.299 R + 0.587 G + 0.114 B`), matching the weights the identity
    /// classifiers are trained against.
    pub fn to_grayscale(&self) -> Frame {
        if self.channels == 1 {
            return self.clone();
        }
        let ch = self.channels as usize;
        let data = self
            .data
            .chunks_exact(ch)
            .map(|px| luma(px[0], px[1], px[2]))
            .collect();
        Frame::new(data, self.width, self.height, 1, self.index)
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = (r as u32 * 299 + g as u32 * 587 + b as u32 * 114 + 500) / 1000;
    y.min(255) as u8
}
