/// A located face: axis-aligned rectangle in frame pixel coordinates.
///
/// Always lies inside the frame it was located in; locators clamp raw
/// detector output before handing regions to the rest of the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FaceRegion {
    /// Builds a region from detector corner coordinates, clamped to a
    /// `frame_width` x `frame_height` frame.
    ///
    /// Returns `None` if nothing of the box remains after clamping.
    pub fn from_corners(
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        frame_width: u32,
        frame_height: u32,
    ) -> Option<Self> {
        let fw = frame_width as f64;
        let fh = frame_height as f64;
        let left = x1.min(x2).clamp(0.0, fw).round() as u32;
        let top = y1.min(y2).clamp(0.0, fh).round() as u32;
        let right = x1.max(x2).clamp(0.0, fw).round() as u32;
        let bottom = y1.max(y2).clamp(0.0, fh).round() as u32;

        if right <= left || bottom <= top {
            return None;
        }
        Some(Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        })
    }
}
