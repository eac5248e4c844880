use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::auth::domain::auth_state::Verdict;
use crate::capture::domain::image_writer::ImageWriter;
use crate::pipeline::authenticate_frame_use_case::FaceOutcome;
use crate::pipeline::frame_display::FrameDisplay;
use crate::shared::frame::Frame;
use crate::shared::region::FaceRegion;

const GRANTED_COLOR: [u8; 3] = [0, 255, 0];
const REJECTED_COLOR: [u8; 3] = [255, 0, 0];
const BORDER: u32 = 2;

/// Draws verdict-coloured boxes onto a copy of the frame and overwrites a
/// single snapshot image every `every` frames.
///
/// The verdict text of each box goes to a JSON sidecar next to the image
/// (`snap.png` -> `snap.json`).
pub struct SnapshotDisplay {
    writer: Box<dyn ImageWriter>,
    path: PathBuf,
    every: usize,
    shown: usize,
}

impl SnapshotDisplay {
    pub fn new(writer: Box<dyn ImageWriter>, path: PathBuf, every: usize) -> Self {
        Self {
            writer,
            path,
            every: every.max(1),
            shown: 0,
        }
    }
}

impl FrameDisplay for SnapshotDisplay {
    fn show(
        &mut self,
        frame: &Frame,
        outcomes: &[FaceOutcome],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let due = self.shown % self.every == 0;
        self.shown += 1;
        if !due {
            return Ok(());
        }

        let mut annotated = frame.clone();
        for outcome in outcomes {
            let color = match outcome.evaluation.verdict {
                Verdict::Granted => GRANTED_COLOR,
                Verdict::Denied | Verdict::Locked => REJECTED_COLOR,
            };
            draw_outline(&mut annotated, &outcome.region, color);
        }
        self.writer.write(&self.path, &annotated)?;
        write_labels(&sidecar_path(&self.path), frame.index(), outcomes)
    }
}

#[derive(Serialize)]
struct SnapshotLabels<'a> {
    frame: usize,
    faces: Vec<LabelledRegion<'a>>,
}

#[derive(Serialize)]
struct LabelledRegion<'a> {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    label: String,
    identity: Option<&'a str>,
}

fn sidecar_path(image: &Path) -> PathBuf {
    image.with_extension("json")
}

fn write_labels(
    path: &Path,
    frame: usize,
    outcomes: &[FaceOutcome],
) -> Result<(), Box<dyn std::error::Error>> {
    let labels = SnapshotLabels {
        frame,
        faces: outcomes
            .iter()
            .map(|o| LabelledRegion {
                x: o.region.x,
                y: o.region.y,
                width: o.region.width,
                height: o.region.height,
                label: o.evaluation.label(),
                identity: o.evaluation.identification.as_ref().and_then(|i| i.label()),
            })
            .collect(),
    };
    std::fs::write(path, serde_json::to_string_pretty(&labels)?)?;
    Ok(())
}

/// Paint a `BORDER`-pixel rectangle outline, clipped to the frame.
/// Grayscale frames get the colour's luma.
fn draw_outline(frame: &mut Frame, region: &FaceRegion, color: [u8; 3]) {
    let (w, h) = (frame.width(), frame.height());
    let x0 = region.x.min(w);
    let y0 = region.y.min(h);
    let x1 = region.x.saturating_add(region.width).min(w);
    let y1 = region.y.saturating_add(region.height).min(h);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let channels = frame.channels() as usize;
    let gray = ((color[0] as u32 * 299 + color[1] as u32 * 587 + color[2] as u32 * 114) / 1000) as u8;
    let mut pixels = frame.as_ndarray_mut();
    for y in y0..y1 {
        for x in x0..x1 {
            let on_border =
                x < x0 + BORDER || x + BORDER >= x1 || y < y0 + BORDER || y + BORDER >= y1;
            if !on_border {
                continue;
            }
            let (row, col) = (y as usize, x as usize);
            if channels == 1 {
                pixels[[row, col, 0]] = gray;
            } else {
                for (c, value) in color.iter().enumerate().take(channels) {
                    pixels[[row, col, c]] = *value;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::domain::authenticator::Evaluation;
    use crate::recognition::domain::identity_oracle::Identification;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingWriter {
        written: Arc<Mutex<Vec<(PathBuf, Frame)>>>,
    }

    impl ImageWriter for RecordingWriter {
        fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            self.written
                .lock()
                .unwrap()
                .push((path.to_path_buf(), frame.clone()));
            Ok(())
        }
    }

    fn outcome(verdict: Verdict) -> FaceOutcome {
        FaceOutcome {
            region: FaceRegion {
                x: 2,
                y: 2,
                width: 10,
                height: 10,
            },
            evaluation: Evaluation {
                verdict,
                failed_attempts: 0,
                identification: None,
            },
        }
    }

    fn pixel(frame: &Frame, x: usize, y: usize) -> [u8; 3] {
        let a = frame.as_ndarray();
        [a[[y, x, 0]], a[[y, x, 1]], a[[y, x, 2]]]
    }

    #[test]
    fn test_outline_colour_follows_verdict() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RecordingWriter::default();
        let mut display =
            SnapshotDisplay::new(Box::new(writer.clone()), dir.path().join("snap.png"), 1);
        let frame = Frame::new(vec![0u8; 20 * 20 * 3], 20, 20, 3, 0);

        display.show(&frame, &[outcome(Verdict::Granted)]).unwrap();
        display.show(&frame, &[outcome(Verdict::Locked)]).unwrap();

        let written = writer.written.lock().unwrap();
        assert_eq!(pixel(&written[0].1, 2, 2), GRANTED_COLOR);
        assert_eq!(pixel(&written[1].1, 11, 6), REJECTED_COLOR);
        // interior untouched
        assert_eq!(pixel(&written[0].1, 7, 7), [0, 0, 0]);
        // source frame untouched
        assert_eq!(pixel(&frame, 2, 2), [0, 0, 0]);
    }

    #[test]
    fn test_writes_every_nth_frame() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RecordingWriter::default();
        let mut display =
            SnapshotDisplay::new(Box::new(writer.clone()), dir.path().join("snap.png"), 3);
        let frame = Frame::new(vec![0u8; 8 * 8 * 3], 8, 8, 3, 0);

        for _ in 0..7 {
            display.show(&frame, &[]).unwrap();
        }
        assert_eq!(writer.written.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_sidecar_carries_verdict_labels() {
        let dir = tempfile::tempdir().unwrap();
        let mut display = SnapshotDisplay::new(
            Box::new(RecordingWriter::default()),
            dir.path().join("snap.png"),
            1,
        );
        let frame = Frame::new(vec![0u8; 20 * 20 * 3], 20, 20, 3, 7);
        let mut denied = outcome(Verdict::Denied);
        denied.evaluation.failed_attempts = 2;
        denied.evaluation.identification = Some(Identification::Unanimous("Eve".into()));

        display
            .show(&frame, &[denied, outcome(Verdict::Locked)])
            .unwrap();

        let json = std::fs::read_to_string(dir.path().join("snap.json")).unwrap();
        let labels: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(labels["frame"], 7);
        assert_eq!(labels["faces"][0]["label"], "ACCESS DENIED (2)");
        assert_eq!(labels["faces"][0]["identity"], "Eve");
        assert_eq!(labels["faces"][0]["width"], 10);
        assert_eq!(labels["faces"][1]["label"], "FRAUD ALERT - SYSTEM LOCKED");
        assert!(labels["faces"][1]["identity"].is_null());
    }

    #[test]
    fn test_grayscale_frame_gets_luma() {
        let mut frame = Frame::new(vec![0u8; 20 * 20], 20, 20, 1, 0);
        draw_outline(&mut frame, &outcome(Verdict::Granted).region, GRANTED_COLOR);
        assert_eq!(frame.as_ndarray()[[2, 2, 0]], 149);
    }

    #[test]
    fn test_region_past_edge_is_clipped() {
        let mut frame = Frame::new(vec![0u8; 10 * 10 * 3], 10, 10, 3, 0);
        let region = FaceRegion {
            x: 6,
            y: 6,
            width: 20,
            height: 20,
        };
        draw_outline(&mut frame, &region, REJECTED_COLOR);
        assert_eq!(pixel(&frame, 6, 6), REJECTED_COLOR);
        assert_eq!(pixel(&frame, 9, 9), REJECTED_COLOR);
    }
}
