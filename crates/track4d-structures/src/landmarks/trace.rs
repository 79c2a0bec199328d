//! Cumulative path length of tracked points.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use track4d_core::{Result, Track4dError};

use super::LandmarkSet;
use crate::stats::ErrorStats;

/// Path length travelled by each marker between two frames.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceLengthResult {
    /// First frame of the summed path.
    pub start_frame: usize,
    /// One past the last frame of the summed path.
    pub end_frame: usize,
    /// Marker names, aligned with `starts` and `lengths`.
    pub labels: Vec<String>,
    /// Position of each marker at `start_frame`.
    pub starts: Vec<Vec3>,
    /// Sum of frame-to-frame displacements of each marker.
    pub lengths: Vec<f32>,
    /// Statistics over `lengths`.
    pub stats: ErrorStats,
}

impl LandmarkSet {
    /// Path length of every marker from `start_frame` to the last frame.
    pub fn trace_length(&self, start_frame: usize) -> Result<TraceLengthResult> {
        let frames = self.require_axis()?.len;
        self.trace_length_between(start_frame, frames)
    }

    /// Path length of every marker over frames `start_frame..end_frame`.
    pub fn trace_length_between(
        &self,
        start_frame: usize,
        end_frame: usize,
    ) -> Result<TraceLengthResult> {
        let frames = self.require_axis()?.len;
        if start_frame >= frames || end_frame > frames || end_frame <= start_frame {
            return Err(Track4dError::FrameOutOfRange {
                frame: start_frame.max(end_frame.saturating_sub(1)),
                len: frames,
            });
        }

        let mut labels = Vec::with_capacity(self.markers.len());
        let mut starts = Vec::with_capacity(self.markers.len());
        let mut lengths = Vec::with_capacity(self.markers.len());
        for marker in self.markers.values() {
            let path = &marker.positions[start_frame..end_frame];
            labels.push(marker.name.clone());
            starts.push(path[0]);
            lengths.push(path.windows(2).map(|w| w[0].distance(w[1])).sum());
        }

        Ok(TraceLengthResult {
            start_frame,
            end_frame,
            stats: ErrorStats::from_values(&lengths),
            labels,
            starts,
            lengths,
        })
    }
}
