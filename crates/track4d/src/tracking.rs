//! Tracking of named query-point sets through a fitted engine.

use glam::Vec3;
use track4d_core::{Registry, Result, TimeAxis, Track4dError};
use track4d_structures::{LandmarkSet, VirtualKeypointSet};

use crate::engine::RegistrationEngine;

/// Owns a fitted engine and every point set tracked through it.
pub struct TrackingAdapter {
    engine: Box<dyn RegistrationEngine>,
    axis: TimeAxis,
    tracked: Registry<VirtualKeypointSet>,
}

impl TrackingAdapter {
    /// Wraps a fitted engine whose frames lie on `axis`.
    ///
    /// Fails with [`Track4dError::Registration`] if the engine holds a
    /// different number of frames.
    pub fn new(engine: Box<dyn RegistrationEngine>, axis: TimeAxis) -> Result<Self> {
        if engine.frame_count() != axis.len {
            return Err(Track4dError::Registration(format!(
                "engine '{}' holds {} frames, the run has {}",
                engine.name(),
                engine.frame_count(),
                axis.len
            )));
        }
        Ok(Self {
            engine,
            axis,
            tracked: Registry::new(),
        })
    }

    /// Name of the wrapped engine.
    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Time axis of the tracked frames.
    pub fn axis(&self) -> TimeAxis {
        self.axis
    }

    /// Tracks `points` (positions at `start_frame`) and stores them under `name`.
    ///
    /// Fails with [`Track4dError::DuplicateTrack`] if `name` is taken; the
    /// engine is not queried in that case.
    pub fn track(&mut self, name: &str, points: &[(String, Vec3)], start_frame: usize) -> Result<()> {
        if self.tracked.contains(name) {
            return Err(Track4dError::DuplicateTrack(name.to_string()));
        }
        if start_frame >= self.axis.len {
            return Err(Track4dError::FrameOutOfRange {
                frame: start_frame,
                len: self.axis.len,
            });
        }

        let mut labels = Vec::with_capacity(points.len());
        let mut tracks = Vec::with_capacity(points.len());
        for (label, point) in points {
            labels.push(label.clone());
            tracks.push(self.engine.query(*point, start_frame)?);
        }
        let set = VirtualKeypointSet::new(name, start_frame, self.axis, labels, tracks)?;
        log::debug!(
            "{} tracked {} points as '{name}' from frame {start_frame}",
            self.engine.name(),
            set.len()
        );
        self.tracked.register(set)
    }

    /// Materialises the set `name` as a landmark set over `start_frame..`.
    pub fn assemble(&self, name: &str, start_frame: usize) -> Result<LandmarkSet> {
        self.tracked.require(name)?.assemble(start_frame)
    }

    /// Names of every tracked set, sorted.
    pub fn tracked_names(&self) -> Vec<String> {
        self.tracked.names().map(ToString::to_string).collect()
    }
}
