use std::path::PathBuf;

/// Properties of an opened frame source.
///
/// Live cameras report no frame count; `fps` is 0 when the source does
/// not advertise a rate (e.g. still-image sequences).
#[derive(Clone, Debug, PartialEq)]
pub struct SourceMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: Option<usize>,
    pub location: PathBuf,
}

impl SourceMetadata {
    pub fn is_live(&self) -> bool {
        self.total_frames.is_none()
    }
}
