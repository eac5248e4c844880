use std::path::Path;

use crate::capture::domain::frame_source::FrameSource;
use crate::shared::frame::Frame;
use crate::shared::source_metadata::SourceMetadata;

/// Capture device input format for the current platform.
#[cfg(target_os = "linux")]
pub const DEFAULT_CAPTURE_FORMAT: &str = "v4l2";
#[cfg(target_os = "macos")]
pub const DEFAULT_CAPTURE_FORMAT: &str = "avfoundation";
#[cfg(target_os = "windows")]
pub const DEFAULT_CAPTURE_FORMAT: &str = "dshow";
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub const DEFAULT_CAPTURE_FORMAT: &str = "";

/// Grabs frames from a webcam (or any ffmpeg-readable file/URL) via
/// ffmpeg-next, converting each decoded frame to RGB24.
///
/// With a `capture_format` set, `location` is handed to that libavdevice
/// input (e.g. `/dev/video0` for `v4l2`); otherwise ffmpeg probes the
/// container, which covers recorded clips.
pub struct FfmpegCameraSource {
    capture_format: Option<String>,
    capture: Option<OpenCapture>,
}

struct OpenCapture {
    input_ctx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
    stream_index: usize,
    frame_index: usize,
    flushing: bool,
}

// Safety: FfmpegCameraSource is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegCameraSource {}

impl FfmpegCameraSource {
    /// Source reading from the platform's default capture device format.
    pub fn camera() -> Self {
        let format =
            (!DEFAULT_CAPTURE_FORMAT.is_empty()).then(|| DEFAULT_CAPTURE_FORMAT.to_string());
        Self {
            capture_format: format,
            capture: None,
        }
    }

    /// Source reading a recorded file or stream URL.
    pub fn file() -> Self {
        Self {
            capture_format: None,
            capture: None,
        }
    }

    pub fn with_capture_format(format: impl Into<String>) -> Self {
        Self {
            capture_format: Some(format.into()),
            capture: None,
        }
    }
}

fn open_input(
    location: &Path,
    capture_format: Option<&str>,
) -> Result<ffmpeg_next::format::context::Input, Box<dyn std::error::Error>> {
    let Some(name) = capture_format else {
        return Ok(ffmpeg_next::format::input(&location)?);
    };

    ffmpeg_next::device::register_all();
    let format = ffmpeg_next::device::input::video()
        .find(|f| f.name() == name)
        .ok_or_else(|| format!("Capture format not available: {name}"))?;
    let ctx = ffmpeg_next::format::open_with(
        &location,
        &ffmpeg_next::format::format::Format::Input(format),
        ffmpeg_next::Dictionary::new(),
    )?;
    Ok(ctx.input())
}

fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}

impl OpenCapture {
    fn try_receive(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }
        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        self.scaler.run(&decoded, &mut rgb_frame)?;

        let pixels = extract_rgb_pixels(&rgb_frame, self.width, self.height);
        let frame = Frame::new(pixels, self.width, self.height, 3, self.frame_index);
        self.frame_index += 1;
        Ok(Some(frame))
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        loop {
            if let Some(frame) = self.try_receive()? {
                return Ok(Some(frame));
            }
            if self.flushing {
                return Ok(None);
            }

            let next = self
                .input_ctx
                .packets()
                .next()
                .map(|(stream, packet)| (stream.index(), packet));
            match next {
                Some((index, packet)) => {
                    if index != self.stream_index {
                        continue;
                    }
                    if let Err(e) = self.decoder.send_packet(&packet) {
                        log::debug!("Dropping undecodable packet: {e}");
                    }
                }
                None => {
                    let _ = self.decoder.send_eof();
                    self.flushing = true;
                }
            }
        }
    }
}

impl FrameSource for FfmpegCameraSource {
    fn open(&mut self, location: &Path) -> Result<SourceMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let input_ctx = open_input(location, self.capture_format.as_deref())?;
        let stream = input_ctx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let width = decoder.width();
        let height = decoder.height();
        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };
        let total_frames = match (self.capture_format.is_some(), stream.frames()) {
            (false, n) if n > 0 => Some(n as usize),
            _ => None,
        };

        log::info!(
            "Opened {} ({width}x{height} @ {fps:.1} fps)",
            location.display()
        );

        self.capture = Some(OpenCapture {
            input_ctx,
            decoder,
            scaler,
            width,
            height,
            stream_index,
            frame_index: 0,
            flushing: false,
        });

        Ok(SourceMetadata {
            width,
            height,
            fps,
            total_frames,
            location: location.to_path_buf(),
        })
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        match self.capture.as_mut() {
            Some(capture) => capture.next_frame(),
            None => Err("FfmpegCameraSource: not opened".into()),
        }
    }

    fn close(&mut self) {
        self.capture = None;
    }
}
