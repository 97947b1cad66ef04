//! Conversion parameters and options.
//!
//! [`TargetParameters`] and [`ConversionRequest`] describe *what* to produce
//! and are validated once at construction, so an invalid request cannot be
//! represented. [`ConversionOptions`] is a builder for *how* to produce it
//! (progress reporting, resize filter, quantizer speed, buffering) without
//! widening every function signature.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use vidgif::{
//!     ConversionOptions, ConversionRequest, Converter, ProgressCallback, ProgressInfo,
//!     ResizeFilter, TargetParameters,
//! };
//!
//! struct LogProgress;
//! impl ProgressCallback for LogProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{:?}: {} frames", info.stage, info.current);
//!     }
//! }
//!
//! let request = ConversionRequest::new(
//!     "clip.mov",
//!     "clip.gif",
//!     TargetParameters::new(10.0, 480)?,
//! );
//! let options = ConversionOptions::new()
//!     .with_progress(Arc::new(LogProgress))
//!     .with_resize_filter(ResizeFilter::Lanczos3);
//! Converter::new(options).convert(&request)?;
//! # Ok::<(), vidgif::ConversionError>(())
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    error::ConversionError,
    progress::{NoOpProgress, ProgressCallback},
    resize::ResizeFilter,
};

/// Frame rate a front end should suggest when the user has not chosen one.
pub const DEFAULT_FRAME_RATE: f64 = 10.0;

/// Largest width or height a GIF logical screen can hold.
pub(crate) const MAX_GIF_DIMENSION: u32 = u16::MAX as u32;

/// Validated output frame rate and width.
///
/// Height is not part of the parameters: it is always derived from the
/// width and the source aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetParameters {
    frame_rate: f64,
    width: u32,
}

impl TargetParameters {
    /// Validate a frame rate and width.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::InvalidParameters`] if `frame_rate` is not a
    /// positive finite number, or `width` is zero or wider than a GIF allows.
    pub fn new(frame_rate: f64, width: u32) -> Result<Self, ConversionError> {
        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            return Err(ConversionError::InvalidParameters(format!(
                "frame rate must be a positive number, got {frame_rate}"
            )));
        }
        if width == 0 || width > MAX_GIF_DIMENSION {
            return Err(ConversionError::InvalidParameters(format!(
                "width must be between 1 and {MAX_GIF_DIMENSION}, got {width}"
            )));
        }
        Ok(Self { frame_rate, width })
    }

    /// Parse a frame rate and width from raw user text.
    ///
    /// Blank fields yield [`ConversionError::MissingParameters`]; text that
    /// does not parse, or parses to a non-positive value, yields
    /// [`ConversionError::InvalidParameters`].
    pub fn parse(frame_rate: &str, width: &str) -> Result<Self, ConversionError> {
        let frame_rate = frame_rate.trim();
        let width = width.trim();
        if frame_rate.is_empty() {
            return Err(ConversionError::MissingParameters("frame rate"));
        }
        if width.is_empty() {
            return Err(ConversionError::MissingParameters("width"));
        }

        let frame_rate: f64 = frame_rate.parse().map_err(|_| {
            ConversionError::InvalidParameters(format!(
                "frame rate must be a number, got {frame_rate:?}"
            ))
        })?;
        let width: i64 = width.parse().map_err(|_| {
            ConversionError::InvalidParameters(format!(
                "width must be a whole number, got {width:?}"
            ))
        })?;
        let width = u32::try_from(width).map_err(|_| {
            ConversionError::InvalidParameters(format!("width must be positive, got {width}"))
        })?;

        Self::new(frame_rate, width)
    }

    /// Requested output frames per second.
    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Requested output width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Display time of each output frame: `floor(1000 / frame_rate)` ms.
    pub fn frame_delay_ms(&self) -> u32 {
        (1000.0 / self.frame_rate).floor() as u32
    }

    /// [`frame_delay_ms`](TargetParameters::frame_delay_ms) in the GIF's
    /// hundredths of a second, rounded and at least 1.
    pub fn frame_delay_centiseconds(&self) -> u16 {
        let centiseconds = (self.frame_delay_ms() as f64 / 10.0).round();
        centiseconds.clamp(1.0, u16::MAX as f64) as u16
    }
}

/// Everything needed for one conversion run.
///
/// Built fresh per invocation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    input: PathBuf,
    output: PathBuf,
    target: TargetParameters,
}

impl ConversionRequest {
    /// Create a request from already-validated parameters.
    pub fn new<I: AsRef<Path>, O: AsRef<Path>>(
        input: I,
        output: O,
        target: TargetParameters,
    ) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            target,
        }
    }

    /// Build a request from raw front-end state.
    ///
    /// Checks run in the order a user would fix them: input selection first,
    /// then blank fields, then malformed numbers.
    ///
    /// # Errors
    ///
    /// [`ConversionError::MissingInput`] when `input` is `None` or empty,
    /// otherwise anything [`TargetParameters::parse`] returns.
    pub fn from_inputs(
        input: Option<&Path>,
        output: &Path,
        frame_rate: &str,
        width: &str,
    ) -> Result<Self, ConversionError> {
        let input = input
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or(ConversionError::MissingInput)?;
        let target = TargetParameters::parse(frame_rate, width)?;
        Ok(Self::new(input, output, target))
    }

    /// Path of the source video.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Path the GIF is written to.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Output frame rate and width.
    pub fn target(&self) -> &TargetParameters {
        &self.target
    }
}

/// How retained frames reach the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferMode {
    /// Hold every resized frame in memory and encode once decoding ends.
    #[default]
    InMemory,
    /// Encode each frame as soon as it is resized. Same frames, same order,
    /// same timing as [`InMemory`](BufferMode::InMemory), bounded memory.
    Streaming,
}

/// Operational settings for a [`Converter`](crate::Converter).
///
/// A default-constructed value reports no progress, resizes with
/// Catmull-Rom, quantizes at speed 10, loops forever, and buffers in memory.
#[derive(Clone)]
pub struct ConversionOptions {
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) batch_size: u64,
    pub(crate) resize_filter: ResizeFilter,
    pub(crate) quantizer_speed: i32,
    pub(crate) repeat: Option<u16>,
    pub(crate) buffer_mode: BufferMode,
}

impl Debug for ConversionOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ConversionOptions")
            .field("batch_size", &self.batch_size)
            .field("resize_filter", &self.resize_filter)
            .field("quantizer_speed", &self.quantizer_speed)
            .field("repeat", &self.repeat)
            .field("buffer_mode", &self.buffer_mode)
            .finish_non_exhaustive()
    }
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            progress: Arc::new(NoOpProgress),
            batch_size: 1,
            resize_filter: ResizeFilter::default(),
            quantizer_speed: 10,
            repeat: None,
            buffer_mode: BufferMode::default(),
        }
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Fire the progress callback every `size` frames. Clamped to at least 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Choose the resampling filter used to shrink frames.
    #[must_use]
    pub fn with_resize_filter(mut self, filter: ResizeFilter) -> Self {
        self.resize_filter = filter;
        self
    }

    /// Palette quantizer speed, 1 (best quality) to 30 (fastest).
    ///
    /// Out-of-range values are clamped.
    #[must_use]
    pub fn with_quantizer_speed(mut self, speed: i32) -> Self {
        self.quantizer_speed = speed.clamp(1, 30);
        self
    }

    /// How many times the GIF repeats. `None` loops forever.
    #[must_use]
    pub fn with_repeat(mut self, repeat: Option<u16>) -> Self {
        self.repeat = repeat;
        self
    }

    /// Choose between whole-sequence and per-frame encoding.
    #[must_use]
    pub fn with_buffer_mode(mut self, mode: BufferMode) -> Self {
        self.buffer_mode = mode;
        self
    }

    /// Selected resize filter.
    pub fn resize_filter(&self) -> ResizeFilter {
        self.resize_filter
    }

    /// Selected quantizer speed.
    pub fn quantizer_speed(&self) -> i32 {
        self.quantizer_speed
    }

    /// Selected buffering mode.
    pub fn buffer_mode(&self) -> BufferMode {
        self.buffer_mode
    }
}
