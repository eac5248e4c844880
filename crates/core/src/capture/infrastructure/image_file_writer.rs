use std::path::Path;

use crate::capture::domain::image_writer::ImageWriter;
use crate::shared::frame::Frame;

/// Writes frames to image files using the `image` crate.
///
/// The format follows the path extension; 1-channel frames are saved as
/// grayscale, 3-channel frames as RGB.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        match frame.channels() {
            1 => image::GrayImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
                .ok_or("Failed to create grayscale image from frame data")?
                .save(path)?,
            3 => image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
                .ok_or("Failed to create image from frame data")?
                .save(path)?,
            n => return Err(format!("Unsupported channel count: {n}").into()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_frame(width: u32, height: u32, rgb: [u8; 3]) -> Frame {
        let data = (0..width * height).flat_map(|_| rgb).collect();
        Frame::new(data, width, height, 3, 0)
    }

    #[test]
    fn test_write_creates_file_and_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.png");
        ImageFileWriter::new()
            .write(&path, &rgb_frame(40, 30, [50, 100, 200]))
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_rgb_roundtrip_preserves_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        ImageFileWriter::new()
            .write(&path, &rgb_frame(20, 20, [50, 100, 200]))
            .unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (20, 20));
        assert_eq!(img.get_pixel(0, 0).0, [50, 100, 200]);
    }

    #[test]
    fn test_grayscale_frame_saved_as_luma() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        let frame = Frame::new(vec![77u8; 16 * 8], 16, 8, 1, 0);
        ImageFileWriter::new().write(&path, &frame).unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!(img.color(), image::ColorType::L8);
        assert_eq!(img.to_luma8().get_pixel(3, 3).0, [77]);
    }

    #[test]
    fn test_unsupported_channel_count_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let frame = Frame::new(vec![0u8; 2 * 2 * 2], 2, 2, 2, 0);
        assert!(ImageFileWriter::new()
            .write(&dir.path().join("x.png"), &frame)
            .is_err());
    }
}
