//! Fixed-stride frame decimation.
//!
//! [`FrameSampler`] decides which source frames survive into the GIF. The
//! stride ("interval") is `native_fps / target_fps`, computed once per run.
//! Frame `i` is kept when `floor(i mod interval) == 0`.
//!
//! This is a modulo rule, not uniform-time resampling:
//!
//! - With an integer interval (30 fps → 10 fps gives 3) every third frame is
//!   kept, starting with frame 0.
//! - With a fractional interval the phase drifts. For `interval = 2.5` the
//!   kept indices are `0, 3, 5, 8, 10, ...`: the right count on average, but
//!   unevenly spaced.
//! - With `interval < 1` (target rate above the native rate) `i mod interval`
//!   is always below one, so **every** frame is kept. Nothing is duplicated;
//!   the output simply plays back faster than the source because each frame
//!   is still shown for `1000 / target_fps` milliseconds.

use crate::error::ConversionError;

/// Decides frame retention for one conversion run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSampler {
    interval: f64,
}

impl FrameSampler {
    /// Build a sampler from the native and requested frame rates.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::InvalidParameters`] if either rate is not a
    /// positive finite number.
    pub fn new(native_fps: f64, target_fps: f64) -> Result<Self, ConversionError> {
        if !(native_fps.is_finite() && native_fps > 0.0) {
            return Err(ConversionError::InvalidParameters(format!(
                "native frame rate must be positive, got {native_fps}"
            )));
        }
        if !(target_fps.is_finite() && target_fps > 0.0) {
            return Err(ConversionError::InvalidParameters(format!(
                "frame rate must be positive, got {target_fps}"
            )));
        }
        Ok(Self {
            interval: native_fps / target_fps,
        })
    }

    /// Source frames per output frame. May be fractional or below one.
    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Whether the frame at `index` (0-based, decode order) is kept.
    pub fn retains(&self, index: u64) -> bool {
        ((index as f64) % self.interval).floor() == 0.0
    }

    /// Number of frames kept out of the first `total` source frames.
    pub fn retained_count(&self, total: u64) -> u64 {
        (0..total).filter(|&index| self.retains(index)).count() as u64
    }

    /// Approximate kept count, `ceil(total / interval)` capped at `total`.
    ///
    /// Useful as a progress total before decoding; the exact figure comes
    /// from [`retained_count`](FrameSampler::retained_count).
    pub fn expected_count(&self, total: u64) -> u64 {
        let expected = (total as f64 / self.interval).ceil() as u64;
        expected.min(total)
    }
}
