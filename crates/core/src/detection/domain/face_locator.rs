use crate::shared::frame::Frame;
use crate::shared::region::FaceRegion;

/// Domain interface for locating faces in a frame.
///
/// Returned regions are clamped to the frame, in the order the face
/// pipeline should evaluate them.
pub trait FaceLocator: Send {
    fn locate(&mut self, frame: &Frame) -> Result<Vec<FaceRegion>, Box<dyn std::error::Error>>;
}
