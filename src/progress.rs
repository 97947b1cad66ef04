//! Progress reporting.
//!
//! A [`ProgressCallback`] observes a conversion as it decodes and encodes.
//! Callbacks cannot stop the run: once started, a conversion finishes or
//! fails on its own.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use vidgif::{
//!     ConversionOptions, ConversionRequest, Converter, ProgressCallback, ProgressInfo,
//!     TargetParameters,
//! };
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("[{:?}] {pct:.1}%", info.stage);
//!         }
//!     }
//! }
//!
//! let request = ConversionRequest::new("in.mp4", "out.gif", TargetParameters::new(10.0, 320)?);
//! let options = ConversionOptions::new().with_progress(Arc::new(PrintProgress));
//! Converter::new(options).convert(&request)?;
//! # Ok::<(), vidgif::ConversionError>(())
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// Which half of the pipeline is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConversionStage {
    /// Decoding and sampling source frames.
    Decoding,
    /// Writing retained frames into the GIF.
    Encoding,
}

/// A snapshot of conversion progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Current pipeline stage.
    pub stage: ConversionStage,
    /// Frames processed so far in this stage.
    pub current: u64,
    /// Frames expected in this stage, if known.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time since the stage started.
    pub elapsed: Duration,
    /// Estimated time remaining in this stage.
    pub estimated_remaining: Option<Duration>,
    /// Source frame index most recently handled (decoding only).
    pub current_frame: Option<u64>,
}

/// Receives progress updates during a conversion.
///
/// Implementations must be [`Send`] and [`Sync`]: conversions started through
/// [`ConversionWorker`](crate::ConversionWorker) report from a background
/// thread.
pub trait ProgressCallback: Send + Sync {
    /// Called every `batch_size` frames and once at the end of each stage.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all notifications.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Tracks timing for one stage and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    stage: ConversionStage,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        stage: ConversionStage,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            stage,
            total,
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
        }
    }

    /// Record one frame and report if the batch threshold is reached.
    pub(crate) fn advance(&mut self, frame_index: Option<u64>) {
        self.current += 1;
        self.items_since_last_report += 1;

        if self.items_since_last_report >= self.batch_size {
            self.report(frame_index);
            self.items_since_last_report = 0;
        }
    }

    /// Emit a final report for the stage.
    pub(crate) fn finish(&mut self) {
        // Totals are estimates; pin them to what actually happened.
        self.total = Some(self.current);
        self.report(None);
    }

    fn report(&self, frame_index: Option<u64>) {
        let elapsed = self.start_time.elapsed();

        let percentage = self
            .total
            .filter(|&total| total > 0)
            .map(|total| ((self.current as f32 / total as f32) * 100.0).min(100.0));

        let estimated_remaining = if self.current > 0 {
            self.total.map(|total| {
                let remaining = total.saturating_sub(self.current);
                elapsed.mul_f64(remaining as f64 / self.current as f64)
            })
        } else {
            None
        };

        self.callback.on_progress(&ProgressInfo {
            stage: self.stage,
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            current_frame: frame_index,
        });
    }
}
