use crate::shared::frame::Frame;

use super::authenticate_frame_use_case::FaceOutcome;

/// Presents a processed frame with its per-face outcomes.
pub trait FrameDisplay: Send {
    fn show(
        &mut self,
        frame: &Frame,
        outcomes: &[FaceOutcome],
    ) -> Result<(), Box<dyn std::error::Error>>;
}

/// Logs outcome labels whenever they change from the previous frame.
#[derive(Default)]
pub struct LogDisplay {
    last: Vec<String>,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameDisplay for LogDisplay {
    fn show(
        &mut self,
        frame: &Frame,
        outcomes: &[FaceOutcome],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let labels: Vec<String> = outcomes.iter().map(|o| o.evaluation.label()).collect();
        if labels != self.last {
            for (outcome, label) in outcomes.iter().zip(&labels) {
                let r = outcome.region;
                log::info!(
                    "frame {}: {label} at ({}, {}) {}x{}",
                    frame.index(),
                    r.x,
                    r.y,
                    r.width,
                    r.height
                );
            }
            self.last = labels;
        }
        Ok(())
    }
}
