//! In-memory frame sources shared by the integration tests.
//!
//! These stand in for decoded video so pipeline behaviour can be tested
//! without FFmpeg fixtures.

#![allow(dead_code)]

use std::{sync::mpsc::Receiver, time::Duration};

use image::{Rgb, RgbImage};
use vidgif::{ConversionError, FrameSampler, FrameSink, FrameSource, VideoMetadata};

pub fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

pub fn synthetic_metadata(width: u32, height: u32, fps: f64, frames: u64) -> VideoMetadata {
    VideoMetadata {
        width,
        height,
        frames_per_second: fps,
        frame_count: frames,
        duration: Duration::from_secs_f64(frames as f64 / fps),
        codec: "synthetic".to_string(),
        format: "memory".to_string(),
    }
}

/// A gradient frame whose colour encodes its index.
pub fn synthetic_frame(width: u32, height: u32, index: u64) -> RgbImage {
    let shade = (index % 256) as u8;
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([shade, (x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8])
    })
}

/// Produces `frame_count` generated frames.
pub struct SyntheticVideo {
    metadata: VideoMetadata,
    /// Indices handed to the sink, in order.
    pub delivered: Vec<u64>,
    /// Fail with a decode error once this many frames have been considered.
    fail_after: Option<u64>,
}

impl SyntheticVideo {
    pub fn new(width: u32, height: u32, fps: f64, frames: u64) -> Self {
        Self {
            metadata: synthetic_metadata(width, height, fps, frames),
            delivered: Vec::new(),
            fail_after: None,
        }
    }

    pub fn failing_after(mut self, frames: u64) -> Self {
        self.fail_after = Some(frames);
        self
    }
}

impl FrameSource for SyntheticVideo {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn decode_frames(
        &mut self,
        sampler: &FrameSampler,
        sink: &mut FrameSink<'_>,
    ) -> Result<u64, ConversionError> {
        for index in 0..self.metadata.frame_count {
            if self.fail_after == Some(index) {
                return Err(ConversionError::VideoDecodeError(format!(
                    "corrupt packet at frame {index}"
                )));
            }
            if sampler.retains(index) {
                self.delivered.push(index);
                sink(
                    index,
                    synthetic_frame(self.metadata.width, self.metadata.height, index),
                )?;
            }
        }
        Ok(self.metadata.frame_count)
    }
}

/// Waits for a signal before producing any frames.
pub struct GatedVideo {
    gate: Receiver<()>,
    inner: SyntheticVideo,
}

impl GatedVideo {
    pub fn new(gate: Receiver<()>, inner: SyntheticVideo) -> Self {
        Self { gate, inner }
    }
}

impl FrameSource for GatedVideo {
    fn metadata(&self) -> &VideoMetadata {
        self.inner.metadata()
    }

    fn decode_frames(
        &mut self,
        sampler: &FrameSampler,
        sink: &mut FrameSink<'_>,
    ) -> Result<u64, ConversionError> {
        self.gate
            .recv()
            .map_err(|error| ConversionError::VideoDecodeError(error.to_string()))?;
        self.inner.decode_frames(sampler, sink)
    }
}

/// Read back a GIF: logical screen size, then `(width, height, delay)` per
/// frame.
pub fn read_gif(bytes: &[u8]) -> ((u16, u16), Vec<(u16, u16, u16)>) {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::Indexed);
    let mut decoder = options
        .read_info(std::io::Cursor::new(bytes))
        .expect("Failed to read GIF header");

    let screen = (decoder.width(), decoder.height());
    let mut frames = Vec::new();
    while let Some(frame) = decoder.read_next_frame().expect("Failed to read GIF frame") {
        frames.push((frame.width, frame.height, frame.delay));
    }
    (screen, frames)
}
