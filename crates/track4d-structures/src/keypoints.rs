//! Virtual keypoints: query points tracked through a sequence.

use glam::Vec3;
use track4d_core::{bounds_of, Result, Structure, TimeAxis, Track4dError};

use crate::landmarks::LandmarkSet;

/// A named set of tracked query points tied to a start frame.
///
/// Positions are stored for every frame of the run axis; frames before
/// `start_frame` may be undefined.
#[derive(Debug, Clone)]
pub struct VirtualKeypointSet {
    name: String,
    start_frame: usize,
    axis: TimeAxis,
    labels: Vec<String>,
    tracks: Vec<Vec<Option<Vec3>>>,
}

impl VirtualKeypointSet {
    /// Creates a tracked set.
    ///
    /// Every track must span the whole axis and be defined from `start_frame`
    /// onwards.
    pub fn new(
        name: impl Into<String>,
        start_frame: usize,
        axis: TimeAxis,
        labels: Vec<String>,
        tracks: Vec<Vec<Option<Vec3>>>,
    ) -> Result<Self> {
        let name = name.into();
        if start_frame >= axis.len {
            return Err(Track4dError::FrameOutOfRange {
                frame: start_frame,
                len: axis.len,
            });
        }
        if labels.len() != tracks.len() {
            return Err(Track4dError::Registration(format!(
                "'{name}': {} labels for {} tracks",
                labels.len(),
                tracks.len()
            )));
        }
        for (label, track) in labels.iter().zip(&tracks) {
            if track.len() != axis.len {
                return Err(Track4dError::Registration(format!(
                    "'{name}': point '{label}' tracked over {} frames, expected {}",
                    track.len(),
                    axis.len
                )));
            }
            if let Some(frame) = (start_frame..axis.len).find(|&f| track[f].is_none()) {
                return Err(Track4dError::Registration(format!(
                    "'{name}': point '{label}' has no position at frame {frame}"
                )));
            }
        }

        Ok(Self {
            name,
            start_frame,
            axis,
            labels,
            tracks,
        })
    }

    /// Returns the number of tracked points.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if no points are tracked.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Materialises the tracked points as a regular landmark set over
    /// `from_frame..len`.
    pub fn assemble(&self, from_frame: usize) -> Result<LandmarkSet> {
        if from_frame < self.start_frame || from_frame >= self.axis.len {
            return Err(Track4dError::FrameOutOfRange {
                frame: from_frame,
                len: self.axis.len,
            });
        }
        let axis = self.axis.window(from_frame, self.axis.len - from_frame)?;
        let tracks = self
            .labels
            .iter()
            .zip(&self.tracks)
            .map(|(label, track)| {
                // defined from start_frame onwards, checked on construction
                let positions = track[from_frame..].iter().flatten().copied().collect();
                (label.clone(), positions)
            })
            .collect();
        LandmarkSet::from_frames(self.name.clone(), axis, tracks)
    }
}

impl Structure for VirtualKeypointSet {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        "VirtualKeypointSet"
    }

    fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        bounds_of(self.tracks.iter().flatten().flatten())
    }
}
