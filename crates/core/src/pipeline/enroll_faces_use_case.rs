use std::path::Path;
use std::time::Instant;

use crate::capture::domain::frame_source::FrameSource;
use crate::capture::domain::image_writer::ImageWriter;
use crate::detection::domain::face_locator::FaceLocator;

use super::authenticate_frame_use_case::elapsed_ms;
use super::operator_console::{OperatorCommand, OperatorConsole};
use super::pipeline_logger::PipelineLogger;

/// Manual enrollment capture: saves every located face as a grayscale
/// crop `<dir>/<n>.jpg` (n from 1) until `count` crops are written, the
/// source ends, or the operator presses Escape or q.
pub struct EnrollFacesUseCase {
    source: Box<dyn FrameSource>,
    locator: Box<dyn FaceLocator>,
    writer: Box<dyn ImageWriter>,
}

impl EnrollFacesUseCase {
    pub fn new(
        source: Box<dyn FrameSource>,
        locator: Box<dyn FaceLocator>,
        writer: Box<dyn ImageWriter>,
    ) -> Self {
        Self {
            source,
            locator,
            writer,
        }
    }

    /// Returns the number of crops written.
    pub fn execute(
        &mut self,
        dir: &Path,
        count: usize,
        console: &mut dyn OperatorConsole,
        logger: &mut dyn PipelineLogger,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        let mut saved = 0;
        while saved < count {
            if let Some(OperatorCommand::Cancel | OperatorCommand::Quit) =
                console.poll_command()
            {
                logger.info(&format!("Cancelled after {saved} of {count} crops"));
                break;
            }
            let t0 = Instant::now();
            let Some(frame) = self.source.next_frame()? else {
                logger.info(&format!("Source ended after {saved} of {count} crops"));
                break;
            };
            logger.timing("acquire", elapsed_ms(t0));

            let t0 = Instant::now();
            let regions = self.locator.locate(&frame)?;
            logger.timing("locate", elapsed_ms(t0));
            logger.metric("faces", regions.len() as f64);

            for region in regions.iter().take(count - saved) {
                let Some(crop) = frame.crop(region) else {
                    continue;
                };
                saved += 1;
                self.writer
                    .write(&dir.join(format!("{saved}.jpg")), &crop.to_grayscale())?;
            }
            logger.frame(frame.index());
        }
        self.source.close();
        logger.info(&format!("Saved {saved} face crops to {}", dir.display()));
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::operator_console::OperatorKey;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::frame::Frame;
    use crate::shared::region::FaceRegion;
    use crate::shared::source_metadata::SourceMetadata;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    struct StubSource {
        remaining: usize,
        index: usize,
    }

    impl FrameSource for StubSource {
        fn open(&mut self, location: &Path) -> Result<SourceMetadata, Box<dyn std::error::Error>> {
            Ok(SourceMetadata {
                width: 40,
                height: 40,
                fps: 30.0,
                total_frames: None,
                location: location.to_path_buf(),
            })
        }

        fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            self.index += 1;
            Ok(Some(Frame::new(vec![200u8; 40 * 40 * 3], 40, 40, 3, self.index)))
        }

        fn close(&mut self) {}
    }

    struct TwoFaces;

    impl FaceLocator for TwoFaces {
        fn locate(&mut self, _frame: &Frame) -> Result<Vec<FaceRegion>, Box<dyn std::error::Error>> {
            Ok(vec![
                FaceRegion {
                    x: 0,
                    y: 0,
                    width: 10,
                    height: 12,
                },
                FaceRegion {
                    x: 20,
                    y: 20,
                    width: 10,
                    height: 10,
                },
            ])
        }
    }

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

    /// Presses `key` before poll number `at` (0-based); idle otherwise.
    struct KeyAt {
        at: Option<usize>,
        key: OperatorKey,
        polls: usize,
    }

    impl KeyAt {
        fn idle() -> Self {
            Self {
                at: None,
                key: OperatorKey::Escape,
                polls: 0,
            }
        }
    }

    impl OperatorConsole for KeyAt {
        fn poll_command(&mut self) -> Option<OperatorCommand> {
            let now = self.polls;
            self.polls += 1;
            (self.at == Some(now)).then(|| OperatorCommand::from_key(self.key))
        }

        fn read_line(&mut self, _prompt: &str) -> Option<String> {
            None
        }

        fn report(&mut self, _message: &str) {}
    }

    fn use_case(frames: usize, writer: &RecordingWriter) -> EnrollFacesUseCase {
        EnrollFacesUseCase::new(
            Box::new(StubSource {
                remaining: frames,
                index: 0,
            }),
            Box::new(TwoFaces),
            Box::new(writer.clone()),
        )
    }

    #[test]
    fn test_stops_exactly_at_count() {
        let writer = RecordingWriter::default();
        let saved = use_case(10, &writer)
            .execute(Path::new("face_data/Gopal"), 5, &mut KeyAt::idle(), &mut NullPipelineLogger)
            .unwrap();
        assert_eq!(saved, 5);

        let written = writer.written.lock().unwrap();
        let names: Vec<_> = written
            .iter()
            .map(|(p, _)| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["1.jpg", "2.jpg", "3.jpg", "4.jpg", "5.jpg"]);
        assert!(written[0].0.starts_with("face_data/Gopal"));
    }

    #[test]
    fn test_crops_are_grayscale() {
        let writer = RecordingWriter::default();
        use_case(1, &writer)
            .execute(Path::new("out"), 50, &mut KeyAt::idle(), &mut NullPipelineLogger)
            .unwrap();
        let written = writer.written.lock().unwrap();
        let (_, crop) = &written[0];
        assert_eq!(crop.channels(), 1);
        assert_eq!((crop.width(), crop.height()), (10, 12));
    }

    #[test]
    fn test_source_end_stops_early() {
        let writer = RecordingWriter::default();
        let saved = use_case(2, &writer)
            .execute(Path::new("out"), 50, &mut KeyAt::idle(), &mut NullPipelineLogger)
            .unwrap();
        assert_eq!(saved, 4);
    }

    #[rstest::rstest]
    #[case(OperatorKey::Escape)]
    #[case(OperatorKey::Char('q'))]
    fn test_operator_key_cancels_capture(#[case] key: OperatorKey) {
        let writer = RecordingWriter::default();
        let mut console = KeyAt {
            at: Some(2),
            key,
            polls: 0,
        };
        let saved = use_case(100, &writer)
            .execute(Path::new("out"), 50, &mut console, &mut NullPipelineLogger)
            .unwrap();
        assert_eq!(saved, 4);
    }

    #[test]
    fn test_other_keys_do_not_cancel() {
        let writer = RecordingWriter::default();
        let mut console = KeyAt {
            at: Some(0),
            key: OperatorKey::Char('m'),
            polls: 0,
        };
        let saved = use_case(3, &writer)
            .execute(Path::new("out"), 50, &mut console, &mut NullPipelineLogger)
            .unwrap();
        assert_eq!(saved, 6);
    }
}
