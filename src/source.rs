//! Source videos.
//!
//! [`FrameSource`] is the seam between the conversion pipeline and whatever
//! produces frames. [`VideoFile`] is the FFmpeg-backed implementation: it
//! opens a file, caches its [`VideoMetadata`], and decodes frames strictly in
//! native order. Only frames the [`FrameSampler`] retains are converted to
//! RGB; the rest are decoded (codecs need them as references) and dropped.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbImage;

use crate::{error::ConversionError, metadata::VideoMetadata, sampling::FrameSampler};

/// Receives each retained frame with its source index.
pub type FrameSink<'a> = dyn FnMut(u64, RgbImage) -> Result<(), ConversionError> + 'a;

/// A sequential source of video frames.
///
/// Implementors yield frames in native temporal order, numbering them from
/// zero, and hand the frames `sampler` retains to `sink` at native
/// resolution.
pub trait FrameSource {
    /// Metadata describing the frames this source produces.
    fn metadata(&self) -> &VideoMetadata;

    /// Decode every frame, passing retained ones to `sink`.
    ///
    /// Returns the number of source frames considered. Stops at the first
    /// error from decoding or from `sink`.
    fn decode_frames(
        &mut self,
        sampler: &FrameSampler,
        sink: &mut FrameSink<'_>,
    ) -> Result<u64, ConversionError>;
}

/// An opened video file.
///
/// Holds the demuxer for the duration of one operation. Create a fresh
/// handle per conversion; handles are not reused.
///
/// # Example
///
/// ```no_run
/// use vidgif::VideoFile;
///
/// let video = VideoFile::open("input.mp4")?;
/// println!("{:?}", video.metadata());
/// # Ok::<(), vidgif::ConversionError>(())
/// ```
pub struct VideoFile {
    input_context: Input,
    stream_index: usize,
    metadata: VideoMetadata,
    path: PathBuf,
}

impl Debug for VideoFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoFile")
            .field("path", &self.path)
            .field("stream_index", &self.stream_index)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl VideoFile {
    /// Open a video file and read its metadata.
    ///
    /// Initialises FFmpeg (idempotent), selects the best video stream, and
    /// reads resolution, frame rate and duration.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::UnreadableInput`] if FFmpeg cannot open the
    /// file, it has no video stream, or the stream reports no frame rate.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ConversionError> {
        let path = path.as_ref();
        log::debug!("Opening video file: {}", path.display());

        ffmpeg_next::init().map_err(|error| {
            unreadable(path, format!("FFmpeg initialisation failed: {error}"))
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| unreadable(path, error))?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or_else(|| unreadable(path, "no video stream found"))?;
        let stream_index = stream.index();

        let decoder_context = CodecContext::from_parameters(stream.parameters())
            .map_err(|error| unreadable(path, format!("bad codec parameters: {error}")))?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| unreadable(path, format!("no video decoder: {error}")))?;

        let width = decoder.width();
        let height = decoder.height();
        if width == 0 || height == 0 {
            return Err(unreadable(path, "video stream has no resolution"));
        }

        let frames_per_second = {
            let average = stream.avg_frame_rate();
            let rate = stream.rate();
            if average.numerator() > 0 && average.denominator() > 0 {
                average.numerator() as f64 / average.denominator() as f64
            } else if rate.numerator() > 0 && rate.denominator() > 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            }
        };
        if frames_per_second <= 0.0 {
            return Err(unreadable(path, "video stream has no frame rate"));
        }

        let container_micros = input_context.duration();
        let duration = if container_micros > 0 {
            Duration::from_micros(container_micros as u64)
        } else {
            let time_base = stream.time_base();
            let seconds = stream.duration().max(0) as f64 * time_base.numerator() as f64
                / time_base.denominator().max(1) as f64;
            Duration::from_secs_f64(seconds)
        };

        let frame_count = match stream.frames() {
            count if count > 0 => count as u64,
            _ => (duration.as_secs_f64() * frames_per_second) as u64,
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let format = input_context.format().name().to_string();

        let metadata = VideoMetadata {
            width,
            height,
            frames_per_second,
            frame_count,
            duration,
            codec,
            format,
        };
        log::info!(
            "Opened {}: {}x{} @ {:.3} fps, {:.2}s, {} frames ({})",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.duration_seconds(),
            metadata.frame_count,
            metadata.codec,
        );

        Ok(Self {
            input_context,
            stream_index,
            metadata,
            path: path.to_path_buf(),
        })
    }

    /// Open `path`, read its metadata, and close it again.
    ///
    /// # Errors
    ///
    /// Same as [`open`](VideoFile::open).
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<VideoMetadata, ConversionError> {
        Ok(Self::open(path)?.metadata)
    }

    /// Cached metadata for the video stream.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Path this handle was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode and return the first frame at native resolution.
    ///
    /// # Errors
    ///
    /// [`ConversionError::VideoDecodeError`] if the stream yields no frame.
    pub fn first_frame(&mut self) -> Result<RgbImage, ConversionError> {
        let mut state = DecodeState::new(self.open_decoder()?);
        let stream_index = self.stream_index;

        for (stream, packet) in self.input_context.packets() {
            if stream.index() != stream_index {
                continue;
            }
            state.decoder.send_packet(&packet)?;
            if state.receive() {
                return state.convert_current();
            }
        }

        state.decoder.send_eof()?;
        if state.receive() {
            return state.convert_current();
        }

        Err(ConversionError::VideoDecodeError(
            "video stream contains no decodable frames".to_string(),
        ))
    }

    fn open_decoder(&self) -> Result<VideoDecoder, ConversionError> {
        let stream = self
            .input_context
            .stream(self.stream_index)
            .ok_or_else(|| unreadable(&self.path, "video stream disappeared"))?;
        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        Ok(decoder_context.decoder().video()?)
    }
}

impl FrameSource for VideoFile {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn decode_frames(
        &mut self,
        sampler: &FrameSampler,
        sink: &mut FrameSink<'_>,
    ) -> Result<u64, ConversionError> {
        let mut state = DecodeState::new(self.open_decoder()?);
        let stream_index = self.stream_index;

        for (stream, packet) in self.input_context.packets() {
            if stream.index() != stream_index {
                continue;
            }
            state.decoder.send_packet(&packet)?;
            state.drain(sampler, sink)?;
        }

        state.decoder.send_eof()?;
        state.drain(sampler, sink)?;

        log::debug!(
            "Decoded {} frames from {}",
            state.next_index,
            self.path.display()
        );
        Ok(state.next_index)
    }
}

/// Decoder plus the scratch frames and scaler used while draining it.
struct DecodeState {
    decoder: VideoDecoder,
    /// Built from the first decoded frame, whose format is authoritative.
    scaler: Option<ScalingContext>,
    decoded: VideoFrame,
    converted: VideoFrame,
    next_index: u64,
}

impl DecodeState {
    fn new(decoder: VideoDecoder) -> Self {
        Self {
            decoder,
            scaler: None,
            decoded: VideoFrame::empty(),
            converted: VideoFrame::empty(),
            next_index: 0,
        }
    }

    /// Pull one frame from the decoder into `decoded`.
    fn receive(&mut self) -> bool {
        self.decoder.receive_frame(&mut self.decoded).is_ok()
    }

    /// Pull every frame the decoder has ready, numbering each in order.
    fn drain(
        &mut self,
        sampler: &FrameSampler,
        sink: &mut FrameSink<'_>,
    ) -> Result<(), ConversionError> {
        while self.receive() {
            let index = self.next_index;
            self.next_index += 1;

            if sampler.retains(index) {
                let image = self.convert_current()?;
                sink(index, image)?;
            }
        }
        Ok(())
    }

    /// Convert `decoded` to a packed RGB image at native resolution.
    fn convert_current(&mut self) -> Result<RgbImage, ConversionError> {
        let width = self.decoded.width();
        let height = self.decoded.height();

        if self.scaler.is_none() {
            self.scaler = Some(ScalingContext::get(
                self.decoded.format(),
                width,
                height,
                Pixel::RGB24,
                width,
                height,
                ScalingFlags::BILINEAR,
            )?);
        }
        if let Some(scaler) = self.scaler.as_mut() {
            scaler.run(&self.decoded, &mut self.converted)?;
        }

        let buffer = packed_rgb_buffer(&self.converted, width, height);
        RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            ConversionError::VideoDecodeError(
                "decoded frame is smaller than its reported resolution".to_string(),
            )
        })
    }
}

/// Copy an RGB24 plane into a tightly-packed buffer, dropping row padding.
fn packed_rgb_buffer(frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = frame.stride(0);
    let row_bytes = width as usize * 3;
    let data = frame.data(0);

    if stride == row_bytes {
        return data[..row_bytes * height as usize].to_vec();
    }

    let mut buffer = Vec::with_capacity(row_bytes * height as usize);
    for row in data.chunks(stride).take(height as usize) {
        buffer.extend_from_slice(&row[..row_bytes]);
    }
    buffer
}

fn unreadable(path: &Path, reason: impl ToString) -> ConversionError {
    ConversionError::UnreadableInput {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
