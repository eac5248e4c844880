use std::path::{Path, PathBuf};

use crate::capture::domain::frame_source::FrameSource;
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::shared::source_metadata::SourceMetadata;

/// Replays a directory of still images as a frame stream.
///
/// Files are visited in lexical order; anything without a known image
/// extension is ignored. Useful for offline runs without a camera.
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    cursor: usize,
}

impl ImageSequenceSource {
    pub fn new() -> Self {
        Self {
            paths: Vec::new(),
            cursor: 0,
        }
    }
}

impl Default for ImageSequenceSource {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn load_rgb(path: &Path, index: usize) -> Result<Frame, Box<dyn std::error::Error>> {
    let img = image::open(path)?.to_rgb8();
    let (width, height) = img.dimensions();
    Ok(Frame::new(img.into_raw(), width, height, 3, index))
}

impl FrameSource for ImageSequenceSource {
    fn open(&mut self, location: &Path) -> Result<SourceMetadata, Box<dyn std::error::Error>> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(location)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_image(p))
            .collect();
        paths.sort();

        let first = paths
            .first()
            .ok_or_else(|| format!("No images found in {}", location.display()))?;
        let (width, height) = image::image_dimensions(first)?;

        let metadata = SourceMetadata {
            width,
            height,
            fps: 0.0,
            total_frames: Some(paths.len()),
            location: location.to_path_buf(),
        };
        self.paths = paths;
        self.cursor = 0;
        Ok(metadata)
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let Some(path) = self.paths.get(self.cursor) else {
            return Ok(None);
        };
        let frame = load_rgb(path, self.cursor)?;
        self.cursor += 1;
        Ok(Some(frame))
    }

    fn close(&mut self) {
        self.paths.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_image(dir: &Path, name: &str, width: u32, height: u32, shade: u8) {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([shade, shade, shade]));
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_open_reports_first_image_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "001.png", 64, 48, 10);
        write_image(dir.path(), "002.png", 64, 48, 20);

        let mut source = ImageSequenceSource::new();
        let meta = source.open(dir.path()).unwrap();
        assert_eq!((meta.width, meta.height), (64, 48));
        assert_eq!(meta.total_frames, Some(2));
        assert!(!meta.is_live());
    }

    #[test]
    fn test_frames_follow_lexical_order_then_end() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "b.png", 8, 8, 200);
        write_image(dir.path(), "a.png", 8, 8, 100);

        let mut source = ImageSequenceSource::new();
        source.open(dir.path()).unwrap();

        let first = source.next_frame().unwrap().unwrap();
        let second = source.next_frame().unwrap().unwrap();
        assert_eq!(first.data()[0], 100);
        assert_eq!(first.index(), 0);
        assert_eq!(second.data()[0], 200);
        assert_eq!(second.index(), 1);
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_non_image_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "frame.png", 8, 8, 1);
        std::fs::write(dir.path().join("notes.txt"), b"not a frame").unwrap();

        let mut source = ImageSequenceSource::new();
        let meta = source.open(dir.path()).unwrap();
        assert_eq!(meta.total_frames, Some(1));
    }

    #[test]
    fn test_open_empty_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = ImageSequenceSource::new();
        assert!(source.open(dir.path()).is_err());
    }

    #[test]
    fn test_next_frame_without_open_is_end_of_stream() {
        let mut source = ImageSequenceSource::new();
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_close_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", 8, 8, 1);
        let mut source = ImageSequenceSource::new();
        source.open(dir.path()).unwrap();
        source.close();
        source.close();
        assert!(source.next_frame().unwrap().is_none());
    }
}
