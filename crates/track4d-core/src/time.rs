//! Regular time axis shared by mesh sequences and resampled landmarks.

use serde::{Deserialize, Serialize};

use crate::error::{Result, Track4dError};

/// Tolerance (seconds) under which two timestamps are considered equal.
pub const TIME_EPSILON: f64 = 1e-9;

/// A regular sampling of time: frame `i` sits at `start_time + i / fps`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeAxis {
    /// Time of frame 0, in seconds.
    pub start_time: f64,
    /// Frames per second.
    pub fps: f64,
    /// Number of frames.
    pub len: usize,
}

impl TimeAxis {
    /// Creates a new time axis.
    pub fn new(start_time: f64, fps: f64, len: usize) -> Result<Self> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(Track4dError::InvalidConfig(format!(
                "fps must be positive, got {fps}"
            )));
        }
        Ok(Self {
            start_time,
            fps,
            len,
        })
    }

    /// Builds the axis covering `[start_time, end_time]` at `fps`, start inclusive.
    ///
    /// The last frame is the latest one not beyond `end_time`.
    pub fn spanning(start_time: f64, end_time: f64, fps: f64) -> Result<Self> {
        if end_time < start_time {
            return Self::new(start_time, fps, 0);
        }
        let steps = ((end_time - start_time) * fps + TIME_EPSILON).floor();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let len = steps as usize + 1;
        Self::new(start_time, fps, len)
    }

    /// Returns the time of frame `index`.
    #[allow(clippy::cast_precision_loss)]
    pub fn time(&self, index: usize) -> f64 {
        self.start_time + index as f64 / self.fps
    }

    /// Returns all frame times.
    pub fn times(&self) -> Vec<f64> {
        (0..self.len).map(|i| self.time(i)).collect()
    }

    /// Returns the time of the last frame, or `None` for an empty axis.
    pub fn end_time(&self) -> Option<f64> {
        self.len.checked_sub(1).map(|last| self.time(last))
    }

    /// Returns the signed frame offset of time `t`, rounded to the nearest frame.
    #[allow(clippy::cast_possible_truncation)]
    pub fn offset_of(&self, t: f64) -> i64 {
        ((t - self.start_time) * self.fps).round() as i64
    }

    /// Returns the sub-axis of `len` frames starting at frame `start`.
    pub fn window(&self, start: usize, len: usize) -> Result<Self> {
        if start + len > self.len {
            return Err(Track4dError::FrameOutOfRange {
                frame: start + len.saturating_sub(1),
                len: self.len,
            });
        }
        Ok(Self {
            start_time: self.time(start),
            fps: self.fps,
            len,
        })
    }

    /// Returns true if the axis has no frames.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
