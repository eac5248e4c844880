use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::source_metadata::SourceMetadata;

/// Supplies a continuous sequence of frames (webcam, recording, stills).
///
/// `next_frame` returns `Ok(None)` at end of stream and `Err` when a frame
/// cannot be acquired; callers treat both as the end of the capture loop.
pub trait FrameSource: Send {
    /// Opens the source at `location` (device node, file, or directory).
    fn open(&mut self, location: &Path) -> Result<SourceMetadata, Box<dyn std::error::Error>>;

    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;

    /// Releases the device or file handles. Safe to call more than once.
    fn close(&mut self);
}
