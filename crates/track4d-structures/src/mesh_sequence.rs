//! Ordered sequence of mesh frames on a shared time axis.

use glam::Vec3;
use track4d_core::{Result, Structure, TimeAxis, Track4dError};

use crate::mesh_frame::MeshFrame;

/// A time series of mesh frames.
///
/// Frame `i` was captured at `axis.time(i)`.
#[derive(Debug, Clone)]
pub struct MeshSequence {
    name: String,
    frames: Vec<MeshFrame>,
    axis: TimeAxis,
}

impl MeshSequence {
    /// Creates a sequence, checking that the axis covers exactly the given frames.
    pub fn new(name: impl Into<String>, frames: Vec<MeshFrame>, axis: TimeAxis) -> Result<Self> {
        if frames.len() != axis.len {
            return Err(Track4dError::DataLoad(format!(
                "{} frames on a time axis of {} frames",
                frames.len(),
                axis.len
            )));
        }
        Ok(Self {
            name: name.into(),
            frames,
            axis,
        })
    }

    /// Returns the number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if the sequence has no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns the time axis.
    pub fn axis(&self) -> TimeAxis {
        self.axis
    }

    /// Returns all frames in order.
    pub fn frames(&self) -> &[MeshFrame] {
        &self.frames
    }

    /// Returns frame `index`.
    pub fn frame(&self, index: usize) -> Result<&MeshFrame> {
        self.frames.get(index).ok_or(Track4dError::FrameOutOfRange {
            frame: index,
            len: self.frames.len(),
        })
    }

    /// Returns the total vertex count over all frames.
    pub fn total_vertices(&self) -> usize {
        self.frames.iter().map(MeshFrame::num_vertices).sum()
    }

    /// Builds a new sequence by transforming every frame, keeping order and axis.
    pub fn try_map_frames(
        &self,
        mut f: impl FnMut(usize, &MeshFrame) -> Result<MeshFrame>,
    ) -> Result<Self> {
        let frames = self
            .frames
            .iter()
            .enumerate()
            .map(|(i, frame)| f(i, frame))
            .collect::<Result<Vec<_>>>()?;
        Self::new(self.name.clone(), frames, self.axis)
    }
}

impl Structure for MeshSequence {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        "MeshSequence"
    }

    fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        self.frames
            .iter()
            .filter_map(Structure::bounding_box)
            .reduce(|(a_min, a_max), (b_min, b_max)| (a_min.min(b_min), a_max.max(b_max)))
    }
}
