//! Source video metadata.
//!
//! [`VideoMetadata`] is read once when a [`VideoFile`](crate::VideoFile) is
//! opened and cached for the lifetime of that handle.

use std::time::Duration;

/// Metadata for the primary video stream of a file.
///
/// # Example
///
/// ```no_run
/// use vidgif::VideoFile;
///
/// let video = VideoFile::open("input.mov")?;
/// let metadata = video.metadata();
/// println!(
///     "{}x{} @ {:.2} fps for {:.1}s",
///     metadata.width,
///     metadata.height,
///     metadata.frames_per_second,
///     metadata.duration_seconds(),
/// );
/// # Ok::<(), vidgif::ConversionError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Native frames per second (average rate for variable-frame-rate input).
    pub frames_per_second: f64,
    /// Estimated total number of frames, from duration and frame rate.
    pub frame_count: u64,
    /// Total duration of the container.
    pub duration: Duration,
    /// Codec name (e.g. `"h264"`, `"prores"`).
    pub codec: String,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`).
    pub format: String,
}

impl VideoMetadata {
    /// Duration in fractional seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.duration.as_secs_f64()
    }

    /// Native width divided by native height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Output height for `target_width` that preserves this video's aspect
    /// ratio. See [`derived_height`].
    pub fn derived_height(&self, target_width: u32) -> u32 {
        derived_height(target_width, self.width, self.height)
    }
}

/// Compute the output height for `target_width` from the native resolution.
///
/// `round(target_width / (native_width / native_height))`, clamped to at
/// least one pixel. Height is never chosen independently of width.
pub fn derived_height(target_width: u32, native_width: u32, native_height: u32) -> u32 {
    if native_width == 0 || native_height == 0 {
        return 1;
    }
    let aspect_ratio = native_width as f64 / native_height as f64;
    let height = (target_width as f64 / aspect_ratio).round();
    (height as u32).max(1)
}
