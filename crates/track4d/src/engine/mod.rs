//! Registration engines.
//!
//! An engine consumes a mesh sequence (and, for marker-guided approaches, a
//! landmark set), fits a deformation model between consecutive frames, and
//! answers point queries by propagating a point through every fitted step.

mod icp;
mod rbf;

use std::collections::BTreeMap;

use glam::Vec3;
use track4d_core::{Result, Track4dError};
use track4d_structures::{LandmarkSet, MeshSequence};

pub use icp::TranslationIcpEngine;
pub use rbf::LandmarkRbfEngine;

/// Approach-specific registration parameters, keyed by name.
pub type FitParams = BTreeMap<String, f64>;

/// Reads `key` from `params`, falling back to `default`.
pub fn param(params: &FitParams, key: &str, default: f64) -> f64 {
    params.get(key).copied().unwrap_or(default)
}

/// Settings an engine is constructed with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// Frame rate of the sequence the engine will see.
    pub sampling_rate: f64,
    /// Estimate a global rigid motion between frames.
    pub enable_rigid: bool,
    /// Estimate a local non-rigid deformation between frames.
    pub enable_nonrigid: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            sampling_rate: 10.0,
            enable_rigid: false,
            enable_nonrigid: true,
        }
    }
}

/// A 4D registration engine.
///
/// Call order is `add_frames`, optionally `load_landmarks`, `fit`, then any
/// number of `query` calls.
pub trait RegistrationEngine {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    /// Loads the mesh frames to register.
    fn add_frames(&mut self, frames: &MeshSequence) -> Result<()>;

    /// Loads a landmark set under `name` to guide the fit.
    fn load_landmarks(&mut self, name: &str, landmarks: &LandmarkSet) -> Result<()>;

    /// Estimates the deformation between every pair of consecutive frames.
    fn fit(&mut self, params: &FitParams) -> Result<()>;

    /// Position of `point` (given at `start_frame`) at every frame of the
    /// sequence. Frames before `start_frame` are `None`.
    fn query(&mut self, point: Vec3, start_frame: usize) -> Result<Vec<Option<Vec3>>>;

    /// Number of frames loaded.
    fn frame_count(&self) -> usize;
}

/// Deformation between frame `k` and frame `k + 1`.
pub(crate) trait FrameStep {
    /// Displacement of a point located at `p` in frame `k`.
    fn displacement(&self, p: Vec3) -> Vec3;
}

/// Carries `point` forward from `start_frame` through every step.
pub(crate) fn propagate<S: FrameStep>(
    steps: &[S],
    frames: usize,
    point: Vec3,
    start_frame: usize,
) -> Result<Vec<Option<Vec3>>> {
    if start_frame >= frames {
        return Err(Track4dError::FrameOutOfRange {
            frame: start_frame,
            len: frames,
        });
    }
    if steps.len() + 1 != frames {
        return Err(Track4dError::Registration(
            "engine queried before fit".to_string(),
        ));
    }

    let mut track = vec![None; frames];
    let mut p = point;
    track[start_frame] = Some(p);
    for (k, step) in steps.iter().enumerate().skip(start_frame) {
        p += step.displacement(p);
        track[k + 1] = Some(p);
    }
    Ok(track)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shift(Vec3);

    impl FrameStep for Shift {
        fn displacement(&self, _p: Vec3) -> Vec3 {
            self.0
        }
    }

    #[test]
    fn test_propagate_from_middle() {
        let steps = vec![Shift(Vec3::X), Shift(Vec3::Y), Shift(Vec3::Z)];
        let track = propagate(&steps, 4, Vec3::ZERO, 1).unwrap();
        assert_eq!(track[0], None);
        assert_eq!(track[1], Some(Vec3::ZERO));
        assert_eq!(track[2], Some(Vec3::Y));
        assert_eq!(track[3], Some(Vec3::Y + Vec3::Z));
    }

    #[test]
    fn test_propagate_unfitted() {
        let steps: Vec<Shift> = Vec::new();
        assert!(matches!(
            propagate(&steps, 4, Vec3::ZERO, 0),
            Err(Track4dError::Registration(_))
        ));
    }

    #[test]
    fn test_propagate_start_out_of_range() {
        let steps = vec![Shift(Vec3::X)];
        assert!(matches!(
            propagate(&steps, 2, Vec3::ZERO, 2),
            Err(Track4dError::FrameOutOfRange { frame: 2, len: 2 })
        ));
    }

    #[test]
    fn test_param_default() {
        let mut params = FitParams::new();
        params.insert("sigma".into(), 12.0);
        assert!((param(&params, "sigma", 40.0) - 12.0).abs() < f64::EPSILON);
        assert!((param(&params, "lambda", 1e-6) - 1e-6).abs() < f64::EPSILON);
    }
}
