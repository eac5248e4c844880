use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::capture::infrastructure::image_sequence_source::is_image;
use crate::recognition::domain::face_sample::FaceSample;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("no labeled face images found under {0}")]
    Empty(PathBuf),
}

/// Labeled face samples loaded from an enrollment directory.
///
/// Layout: `<root>/<label>/<any>.jpg`, one subdirectory per identity, as
/// written by the enrollment capture loop.
#[derive(Clone, Debug, Default)]
pub struct Gallery {
    entries: Vec<(String, FaceSample)>,
}

impl Gallery {
    pub fn new(entries: Vec<(String, FaceSample)>) -> Self {
        Self { entries }
    }

    pub fn load(root: &Path) -> Result<Self, GalleryError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| GalleryError::Io { path, source }
        };

        let mut label_dirs: Vec<PathBuf> = fs::read_dir(root)
            .map_err(io_err(root))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_dir())
            .collect();
        label_dirs.sort();

        let mut entries = Vec::new();
        for dir in &label_dirs {
            let Some(label) = dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let mut files: Vec<PathBuf> = fs::read_dir(dir)
                .map_err(io_err(dir))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_image(p))
                .collect();
            files.sort();

            for file in files {
                let img = image::open(&file)
                    .map_err(|source| GalleryError::Image {
                        path: file.clone(),
                        source,
                    })?
                    .to_luma8();
                entries.push((label.to_string(), FaceSample::from_gray_image(&img)));
            }
        }

        if entries.is_empty() {
            return Err(GalleryError::Empty(root.to_path_buf()));
        }
        log::info!(
            "Loaded {} face samples for {} identities from {}",
            entries.len(),
            label_dirs.len(),
            root.display()
        );
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[(String, FaceSample)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct labels in first-seen order.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for (label, _) in &self.entries {
            if !labels.contains(&label.as_str()) {
                labels.push(label);
            }
        }
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_face(dir: &Path, label: &str, name: &str, shade: u8) {
        let label_dir = dir.join(label);
        fs::create_dir_all(&label_dir).unwrap();
        image::GrayImage::from_pixel(64, 64, image::Luma([shade]))
            .save(label_dir.join(name))
            .unwrap();
    }

    #[test]
    fn test_load_reads_one_label_per_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_face(dir.path(), "Gopal", "1.jpg", 200);
        write_face(dir.path(), "Gopal", "2.jpg", 210);
        write_face(dir.path(), "Eve", "1.png", 20);

        let gallery = Gallery::load(dir.path()).unwrap();
        assert_eq!(gallery.len(), 3);
        assert_eq!(gallery.labels(), vec!["Eve", "Gopal"]);
    }

    #[test]
    fn test_samples_are_normalized() {
        let dir = tempfile::tempdir().unwrap();
        write_face(dir.path(), "Gopal", "1.png", 90);

        let gallery = Gallery::load(dir.path()).unwrap();
        let (_, sample) = &gallery.entries()[0];
        assert_eq!(sample.pixels().len(), 2500);
        assert!(sample.pixels().iter().all(|&p| (p - 90.0).abs() <= 1.0));
    }

    #[test]
    fn test_stray_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_face(dir.path(), "Gopal", "1.png", 90);
        fs::write(dir.path().join("Gopal").join("notes.txt"), b"x").unwrap();
        fs::write(dir.path().join("README"), b"x").unwrap();

        assert_eq!(Gallery::load(dir.path()).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_root_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Gallery::load(dir.path()),
            Err(GalleryError::Empty(_))
        ));
    }

    #[test]
    fn test_missing_root_is_io_error() {
        assert!(matches!(
            Gallery::load(Path::new("/nonexistent/face_data")),
            Err(GalleryError::Io { .. })
        ));
    }
}
