//! Error types for the `vidgif` crate.
//!
//! [`ConversionError`] is the single error type returned by every fallible
//! operation. The first six variants mirror what a front end reports to the
//! user (missing selection, bad parameters, unreadable input, unwritable
//! output, nothing to encode); the rest carry upstream failures from FFmpeg,
//! the GIF encoder, and the filesystem.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `vidgif` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConversionError {
    /// No input video was selected.
    #[error("Missing file: please select a video file")]
    MissingInput,

    /// The frame rate or width was left blank.
    #[error("Missing value for {0}: please enter all the required values")]
    MissingParameters(&'static str),

    /// The frame rate or width is not a valid positive number.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The decoder could not open the input, or it holds no usable video.
    #[error("Failed to open video at {path}: {reason}")]
    UnreadableInput {
        /// Path that was passed to [`crate::VideoFile::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The output could not be created or moved into place.
    #[error("Cannot write output {path}: {reason}")]
    UnwritableOutput {
        /// Requested output path.
        path: PathBuf,
        /// Underlying reason the write failed.
        reason: String,
    },

    /// Sampling retained no frames, so there is nothing to encode.
    #[error("No frames were retained from the source video")]
    EmptyOutput,

    /// A conversion is already running on this worker.
    #[error("A conversion is already in progress")]
    Busy,

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// GIF encoding failed.
    #[error("GIF encoding error: {0}")]
    GifEncodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate during frame conversion.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// The background conversion thread panicked or was aborted.
    #[error("Conversion worker failed: {0}")]
    WorkerFailed(String),
}

impl ConversionError {
    /// Returns `true` for errors detected before any decoding starts.
    ///
    /// These are the errors a front end reports synchronously.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ConversionError::MissingInput
                | ConversionError::MissingParameters(_)
                | ConversionError::InvalidParameters(_)
        )
    }
}

impl From<FfmpegError> for ConversionError {
    fn from(error: FfmpegError) -> Self {
        ConversionError::FfmpegError(error.to_string())
    }
}

impl From<gif::EncodingError> for ConversionError {
    fn from(error: gif::EncodingError) -> Self {
        ConversionError::GifEncodeError(error.to_string())
    }
}
