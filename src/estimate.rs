//! Output size estimation.
//!
//! The estimate multiplies the raw RGB byte count of every output frame by a
//! fixed empirical compression factor. It is a rough preview figure for a
//! front end, not a prediction: real GIF sizes depend heavily on content.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::Path,
};

use crate::{
    configuration::TargetParameters, error::ConversionError, metadata::derived_height,
    source::VideoFile,
};

/// Ratio between encoded GIF bytes and raw RGB24 bytes, measured empirically.
pub const COMPRESSION_FACTOR: f64 = 0.164162;

const BYTES_PER_PIXEL: f64 = 3.0;
const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// Estimate the output size in megabytes.
///
/// `total_frames = floor(duration * fps)`; the height is derived from
/// `target_width` and the native aspect ratio. Callers are expected to
/// reject non-positive rates and widths beforehand; the result for such
/// inputs is meaningless but never panics.
///
/// # Example
///
/// ```
/// let megabytes = vidgif::estimate_size(10.0, 480, 10.0, 1920, 1080);
/// assert!(megabytes > 0.0);
/// ```
pub fn estimate_size(
    target_fps: f64,
    target_width: u32,
    video_duration: f64,
    native_width: u32,
    native_height: u32,
) -> f64 {
    let total_frames = (video_duration * target_fps).floor().max(0.0);
    let height = derived_height(target_width, native_width, native_height) as f64;
    total_frames * target_width as f64 * height * BYTES_PER_PIXEL * COMPRESSION_FACTOR
        / BYTES_PER_MEGABYTE
}

/// An estimated output size, formatted the way a status line shows it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeEstimate {
    /// Estimated size in megabytes.
    pub megabytes: f64,
}

impl Display for SizeEstimate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Estimated Size: {:.2} MB", self.megabytes)
    }
}

/// Probe `path` and estimate the GIF size for `target`.
///
/// Opens the file only to read its duration and resolution.
///
/// # Errors
///
/// Returns [`ConversionError::UnreadableInput`] if the file cannot be opened.
pub fn estimate_for_file<P: AsRef<Path>>(
    path: P,
    target: &TargetParameters,
) -> Result<SizeEstimate, ConversionError> {
    let metadata = VideoFile::probe(path)?;
    let megabytes = estimate_size(
        target.frame_rate(),
        target.width(),
        metadata.duration_seconds(),
        metadata.width,
        metadata.height,
    );
    log::debug!(
        "Estimated {megabytes:.2} MB for {:.2} fps at width {}",
        target.frame_rate(),
        target.width()
    );
    Ok(SizeEstimate { megabytes })
}
