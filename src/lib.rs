//! # vidgif
//!
//! Turn a video file into a looping animated GIF.
//!
//! `vidgif` decodes a video with FFmpeg (via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate), keeps frames
//! at a reduced rate, shrinks them to a chosen width while preserving the
//! aspect ratio, and encodes the result with the
//! [`gif`](https://crates.io/crates/gif) crate.
//!
//! ## Quick Start
//!
//! ### Convert a clip
//!
//! ```no_run
//! let report = vidgif::convert("clip.mov", "clip.gif", 10.0, 480)?;
//! println!("{} frames, {}x{}", report.frames_written, report.width, report.height);
//! # Ok::<(), vidgif::ConversionError>(())
//! ```
//!
//! ### Estimate the output size first
//!
//! ```no_run
//! use vidgif::{TargetParameters, estimate_for_file};
//!
//! let target = TargetParameters::new(10.0, 480)?;
//! println!("{}", estimate_for_file("clip.mov", &target)?);
//! # Ok::<(), vidgif::ConversionError>(())
//! ```
//!
//! ### Convert in the background
//!
//! ```no_run
//! use vidgif::{ConversionRequest, ConversionWorker, TargetParameters};
//!
//! # async fn example() -> Result<(), vidgif::ConversionError> {
//! let worker = ConversionWorker::default();
//! let request = ConversionRequest::new("clip.mov", "clip.gif", TargetParameters::new(10.0, 480)?);
//! let report = worker.start(request)?.await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## How frames are chosen
//!
//! The stride between kept frames is `native_fps / target_fps`, and frame `i`
//! is kept when `floor(i mod stride) == 0`. See [`FrameSampler`] for how this
//! behaves with fractional strides and with target rates above the native
//! rate.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod configuration;
mod convert;
pub mod encoder;
pub mod error;
pub mod estimate;
pub mod ffmpeg;
pub mod metadata;
pub mod preview;
pub mod progress;
pub mod resize;
pub mod sampling;
pub mod source;
pub mod worker;

pub use configuration::{
    BufferMode, ConversionOptions, ConversionRequest, DEFAULT_FRAME_RATE, TargetParameters,
};
pub use convert::{ConversionReport, Converter, convert};
pub use encoder::{GifSettings, GifWriter, encode_gif};
pub use error::ConversionError;
pub use estimate::{COMPRESSION_FACTOR, SizeEstimate, estimate_for_file, estimate_size};
pub use ffmpeg::{DecoderVerbosity, set_decoder_verbosity};
pub use metadata::{VideoMetadata, derived_height};
pub use preview::{PREVIEW_HEIGHT, PREVIEW_WIDTH, preview};
pub use progress::{ConversionStage, ProgressCallback, ProgressInfo};
pub use resize::{ResizeFilter, resize_frame};
pub use sampling::FrameSampler;
pub use source::{FrameSink, FrameSource, VideoFile};
pub use worker::{ConversionStatus, ConversionTask, ConversionWorker};
