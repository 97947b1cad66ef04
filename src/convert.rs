//! Video to GIF conversion.
//!
//! [`Converter`] runs the whole pipeline for one request: open the source,
//! decimate with a [`FrameSampler`], resize each retained frame to the
//! target width and derived height, and encode a looping GIF.
//!
//! The GIF is written to a hidden temporary file beside the output and
//! renamed into place only after the last byte is written, so a failed run
//! never leaves a truncated file at the output path. An existing file at
//! the output path is replaced.

use std::{
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use image::RgbImage;
use tempfile::NamedTempFile;

use crate::{
    configuration::{
        BufferMode, ConversionOptions, ConversionRequest, MAX_GIF_DIMENSION, TargetParameters,
    },
    encoder::{GifSettings, GifWriter},
    error::ConversionError,
    progress::{ConversionStage, ProgressTracker},
    resize::resize_frame,
    sampling::FrameSampler,
    source::{FrameSource, VideoFile},
};

/// Summary of a finished conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    /// Where the GIF was written.
    pub output: PathBuf,
    /// Source frames decoded.
    pub frames_considered: u64,
    /// Frames written to the GIF.
    pub frames_written: u64,
    /// Source frames per output frame.
    pub interval: f64,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels, derived from the width.
    pub height: u32,
    /// Display time of each frame in milliseconds.
    pub frame_delay_ms: u32,
}

/// Runs conversions with a fixed set of [`ConversionOptions`].
///
/// # Example
///
/// ```no_run
/// use vidgif::{ConversionRequest, Converter, TargetParameters};
///
/// let request = ConversionRequest::new(
///     "holiday.mov",
///     "holiday.gif",
///     TargetParameters::new(10.0, 480)?,
/// );
/// let report = Converter::default().convert(&request)?;
/// println!("{} frames at {}x{}", report.frames_written, report.width, report.height);
/// # Ok::<(), vidgif::ConversionError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConversionOptions,
}

impl Converter {
    /// Create a converter with the given options.
    pub fn new(options: ConversionOptions) -> Self {
        Self { options }
    }

    /// Options this converter runs with.
    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Open the request's input and convert it.
    ///
    /// # Errors
    ///
    /// - [`ConversionError::UnreadableInput`] if the input cannot be opened.
    ///   Nothing is created at the output path.
    /// - [`ConversionError::UnwritableOutput`] if the output directory cannot
    ///   be written.
    /// - [`ConversionError::InvalidParameters`] if the derived height is
    ///   taller than a GIF allows. Checked before decoding.
    /// - [`ConversionError::EmptyOutput`] if no frames were retained.
    /// - Decode and encode errors from FFmpeg and the GIF encoder.
    pub fn convert(&self, request: &ConversionRequest) -> Result<ConversionReport, ConversionError> {
        let mut source = VideoFile::open(request.input())?;
        self.convert_source(&mut source, request.output(), request.target())
    }

    /// Convert frames from any [`FrameSource`].
    ///
    /// # Errors
    ///
    /// As [`convert`](Converter::convert), minus opening the input.
    pub fn convert_source<S: FrameSource + ?Sized>(
        &self,
        source: &mut S,
        output: &Path,
        target: &TargetParameters,
    ) -> Result<ConversionReport, ConversionError> {
        let metadata = source.metadata().clone();
        let sampler = FrameSampler::new(metadata.frames_per_second, target.frame_rate())?;
        let width = target.width();
        let height = metadata.derived_height(width);
        if height > MAX_GIF_DIMENSION {
            return Err(ConversionError::InvalidParameters(format!(
                "width {width} gives a height of {height} for a {}x{} source; GIF allows at most {MAX_GIF_DIMENSION}",
                metadata.width, metadata.height
            )));
        }
        let settings = GifSettings {
            delay_centiseconds: target.frame_delay_centiseconds(),
            repeat: self.options.repeat,
            speed: self.options.quantizer_speed,
        };

        log::info!(
            "Converting {}x{} @ {:.3} fps to {}x{} @ {:.3} fps (interval {:.4}, {:?})",
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            width,
            height,
            target.frame_rate(),
            sampler.interval(),
            self.options.buffer_mode,
        );

        let mut staging = staging_file(output)?;
        let (frames_considered, frames_written) = {
            let writer = BufWriter::new(staging.as_file_mut());
            let (frames_considered, writer, frames_written) = match self.options.buffer_mode {
                BufferMode::InMemory => {
                    self.encode_buffered(source, &sampler, writer, width, height, settings)?
                }
                BufferMode::Streaming => {
                    self.encode_streaming(source, &sampler, writer, width, height, settings)?
                }
            };
            writer.into_inner().map_err(|error| error.into_error())?;
            (frames_considered, frames_written)
        };

        staging
            .persist(output)
            .map_err(|error| unwritable(output, error.error))?;

        log::info!(
            "Wrote {frames_written} of {frames_considered} frames to {}",
            output.display()
        );

        Ok(ConversionReport {
            output: output.to_path_buf(),
            frames_considered,
            frames_written,
            interval: sampler.interval(),
            width,
            height,
            frame_delay_ms: target.frame_delay_ms(),
        })
    }

    /// Decode everything into memory, then encode the whole sequence.
    fn encode_buffered<S: FrameSource + ?Sized, W: Write>(
        &self,
        source: &mut S,
        sampler: &FrameSampler,
        writer: W,
        width: u32,
        height: u32,
        settings: GifSettings,
    ) -> Result<(u64, W, u64), ConversionError> {
        let filter = self.options.resize_filter;
        let mut decoding = self.decoding_tracker(source, sampler);
        let mut frames: Vec<RgbImage> = Vec::new();

        let frames_considered = source.decode_frames(sampler, &mut |index, frame| {
            frames.push(resize_frame(frame, width, height, filter));
            decoding.advance(Some(index));
            Ok(())
        })?;
        decoding.finish();

        if frames.is_empty() {
            return Err(ConversionError::EmptyOutput);
        }

        let mut encoding = ProgressTracker::new(
            self.options.progress.clone(),
            ConversionStage::Encoding,
            Some(frames.len() as u64),
            self.options.batch_size,
        );
        let mut gif = GifWriter::new(writer, width, height, settings)?;
        for frame in &frames {
            gif.write_frame(frame)?;
            encoding.advance(None);
        }
        encoding.finish();

        let frames_written = gif.frames_written();
        Ok((frames_considered, gif.finish()?, frames_written))
    }

    /// Encode each frame as soon as it has been resized.
    fn encode_streaming<S: FrameSource + ?Sized, W: Write>(
        &self,
        source: &mut S,
        sampler: &FrameSampler,
        writer: W,
        width: u32,
        height: u32,
        settings: GifSettings,
    ) -> Result<(u64, W, u64), ConversionError> {
        let filter = self.options.resize_filter;
        let mut decoding = self.decoding_tracker(source, sampler);
        let mut gif = GifWriter::new(writer, width, height, settings)?;

        let frames_considered = source.decode_frames(sampler, &mut |index, frame| {
            gif.write_frame(&resize_frame(frame, width, height, filter))?;
            decoding.advance(Some(index));
            Ok(())
        })?;
        decoding.finish();

        let frames_written = gif.frames_written();
        if frames_written == 0 {
            return Err(ConversionError::EmptyOutput);
        }
        Ok((frames_considered, gif.finish()?, frames_written))
    }

    /// Progress for the decode stage counts retained frames, so the total is
    /// the sampler's estimate over the container's frame count.
    fn decoding_tracker<S: FrameSource + ?Sized>(
        &self,
        source: &S,
        sampler: &FrameSampler,
    ) -> ProgressTracker {
        let expected = sampler.expected_count(source.metadata().frame_count);
        ProgressTracker::new(
            self.options.progress.clone(),
            ConversionStage::Decoding,
            (expected > 0).then_some(expected),
            self.options.batch_size,
        )
    }
}

/// Convert `input_path` into a GIF at `output_path` with default options.
///
/// # Errors
///
/// [`ConversionError::InvalidParameters`] for a non-positive rate or width,
/// otherwise as [`Converter::convert`].
///
/// # Example
///
/// ```no_run
/// let report = vidgif::convert("clip.mp4", "clip.gif", 10.0, 320)?;
/// assert_eq!(report.width, 320);
/// # Ok::<(), vidgif::ConversionError>(())
/// ```
pub fn convert<I: AsRef<Path>, O: AsRef<Path>>(
    input_path: I,
    output_path: O,
    target_fps: f64,
    target_width: u32,
) -> Result<ConversionReport, ConversionError> {
    let target = TargetParameters::new(target_fps, target_width)?;
    let request = ConversionRequest::new(input_path, output_path, target);
    Converter::default().convert(&request)
}

/// Create the hidden temporary file the GIF is staged in.
///
/// On unix the file gets the mode `File::create` would give it, or the
/// existing output's mode when replacing a file.
fn staging_file(output: &Path) -> Result<NamedTempFile, ConversionError> {
    let directory = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".vidgif-").suffix(".part");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Subject to the umask at creation.
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let staging = builder
        .tempfile_in(directory)
        .map_err(|error| unwritable(output, error))?;

    #[cfg(unix)]
    {
        if let Ok(existing) = std::fs::metadata(output) {
            staging
                .as_file()
                .set_permissions(existing.permissions())
                .map_err(|error| unwritable(output, error))?;
        }
    }

    Ok(staging)
}

fn unwritable(path: &Path, reason: impl ToString) -> ConversionError {
    ConversionError::UnwritableOutput {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
