//! Still previews of a source video.
//!
//! A preview is the first decoded frame squeezed into a fixed box. The box
//! is filled exactly, so previews of non-16:9 sources are distorted; they are
//! meant as a quick "is this the right file" check, not as output.

use std::path::Path;

use image::RgbImage;

use crate::{
    error::ConversionError,
    resize::{ResizeFilter, resize_frame},
    source::VideoFile,
};

/// Default preview width in pixels.
pub const PREVIEW_WIDTH: u32 = 320;
/// Default preview height in pixels.
pub const PREVIEW_HEIGHT: u32 = 180;

/// Decode the first frame of `path` and resize it to `width` × `height`.
///
/// # Errors
///
/// [`ConversionError::InvalidParameters`] for a zero dimension,
/// [`ConversionError::UnreadableInput`] if the file cannot be opened, and
/// [`ConversionError::VideoDecodeError`] if it has no decodable frame.
///
/// # Example
///
/// ```no_run
/// use vidgif::{PREVIEW_HEIGHT, PREVIEW_WIDTH};
///
/// let still = vidgif::preview("clip.mov", PREVIEW_WIDTH, PREVIEW_HEIGHT)?;
/// still.save("clip_preview.png")?;
/// # Ok::<(), vidgif::ConversionError>(())
/// ```
pub fn preview<P: AsRef<Path>>(
    path: P,
    width: u32,
    height: u32,
) -> Result<RgbImage, ConversionError> {
    if width == 0 || height == 0 {
        return Err(ConversionError::InvalidParameters(format!(
            "preview size must be positive, got {width}x{height}"
        )));
    }

    let mut video = VideoFile::open(path)?;
    let frame = video.first_frame()?;
    Ok(resize_frame(frame, width, height, ResizeFilter::Triangle))
}
