//! Animated GIF encoding.
//!
//! [`GifWriter`] wraps the `gif` crate's encoder for a fixed frame size and
//! delay. Frames are quantized to a 256-colour palette one at a time, so the
//! same writer serves both whole-sequence encoding ([`encode_gif`]) and
//! streaming encoding from the converter.

use std::io::Write;

use gif::{Encoder, Frame, Repeat};
use image::RgbImage;

use crate::error::ConversionError;

/// Per-file GIF settings shared by every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GifSettings {
    /// Delay between frames in hundredths of a second.
    pub delay_centiseconds: u16,
    /// Repeat count. `None` loops forever.
    pub repeat: Option<u16>,
    /// Quantizer speed, 1 (best) to 30 (fastest).
    pub speed: i32,
}

impl Default for GifSettings {
    fn default() -> Self {
        Self {
            delay_centiseconds: 10,
            repeat: None,
            speed: 10,
        }
    }
}

/// Incremental GIF writer with a fixed logical screen size.
pub struct GifWriter<W: Write> {
    encoder: Encoder<W>,
    width: u16,
    height: u16,
    settings: GifSettings,
    frames_written: u64,
}

impl<W: Write> GifWriter<W> {
    /// Write the GIF header for a `width` × `height` animation.
    ///
    /// # Errors
    ///
    /// [`ConversionError::GifEncodeError`] if a dimension exceeds 65535 or
    /// the header cannot be written.
    pub fn new(
        writer: W,
        width: u32,
        height: u32,
        settings: GifSettings,
    ) -> Result<Self, ConversionError> {
        let width = gif_dimension(width, "width")?;
        let height = gif_dimension(height, "height")?;

        let mut encoder = Encoder::new(writer, width, height, &[])?;
        let repeat = match settings.repeat {
            None => Repeat::Infinite,
            Some(count) => Repeat::Finite(count),
        };
        encoder.set_repeat(repeat)?;

        Ok(Self {
            encoder,
            width,
            height,
            settings,
            frames_written: 0,
        })
    }

    /// Quantize and append one frame.
    ///
    /// # Errors
    ///
    /// [`ConversionError::GifEncodeError`] if the frame size differs from the
    /// writer's or the write fails.
    pub fn write_frame(&mut self, image: &RgbImage) -> Result<(), ConversionError> {
        if image.width() != u32::from(self.width) || image.height() != u32::from(self.height) {
            return Err(ConversionError::GifEncodeError(format!(
                "frame is {}x{}, expected {}x{}",
                image.width(),
                image.height(),
                self.width,
                self.height
            )));
        }

        let speed = self.settings.speed.clamp(1, 30);
        let mut frame = Frame::from_rgb_speed(self.width, self.height, image.as_raw(), speed);
        frame.delay = self.settings.delay_centiseconds;
        self.encoder.write_frame(&frame)?;
        self.frames_written += 1;
        Ok(())
    }

    /// Frames appended so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Write the trailer and return the underlying writer.
    pub fn finish(self) -> Result<W, ConversionError> {
        log::debug!("Finishing GIF with {} frames", self.frames_written);
        Ok(self.encoder.into_inner()?)
    }
}

/// Encode an ordered frame sequence as an animated GIF into `writer`.
///
/// The animation takes the size of the first frame; every frame must match.
///
/// # Errors
///
/// [`ConversionError::EmptyOutput`] if `frames` is empty, otherwise any
/// [`GifWriter`] error.
pub fn encode_gif<W: Write>(
    writer: W,
    frames: &[RgbImage],
    settings: GifSettings,
) -> Result<W, ConversionError> {
    let first = frames.first().ok_or(ConversionError::EmptyOutput)?;
    log::debug!(
        "Encoding {} frames at {}x{} (delay={}cs)",
        frames.len(),
        first.width(),
        first.height(),
        settings.delay_centiseconds,
    );

    let mut gif = GifWriter::new(writer, first.width(), first.height(), settings)?;
    for frame in frames {
        gif.write_frame(frame)?;
    }
    gif.finish()
}

fn gif_dimension(value: u32, name: &str) -> Result<u16, ConversionError> {
    u16::try_from(value)
        .ok()
        .filter(|&value| value > 0)
        .ok_or_else(|| {
            ConversionError::GifEncodeError(format!("{name} {value} is outside 1..=65535"))
        })
}
