//! Marker-free translation ICP between consecutive frames.
//!
//! Each step aligns a subsample of frame `k` onto frame `k + 1` with a
//! translation-only iterative closest point loop. With non-rigid estimation
//! enabled, the residual between every aligned source point and its closest
//! target is kept, and a query point additionally moves by the mean residual
//! of its nearest source points.

use glam::Vec3;
use track4d_core::{Result, Track4dError};
use track4d_structures::{LandmarkSet, MeshSequence, PointIndex};

use super::{param, propagate, EngineSettings, FitParams, FrameStep, RegistrationEngine};

const DEFAULT_MAX_POINTS: f64 = 500.0;
const DEFAULT_ITERATIONS: f64 = 15.0;
const DEFAULT_TOLERANCE: f64 = 1e-4;
const DEFAULT_NEIGHBORS: f64 = 8.0;

/// Marker-free engine estimating frame-to-frame motion from geometry alone.
pub struct TranslationIcpEngine {
    settings: EngineSettings,
    clouds: Vec<Vec<Vec3>>,
    neighbors: usize,
    steps: Vec<IcpStep>,
}

struct IcpStep {
    translation: Vec3,
    sources: PointIndex,
    residuals: Vec<Vec3>,
    neighbors: usize,
}

impl IcpStep {
    fn rigid(translation: Vec3) -> Self {
        Self {
            translation,
            sources: PointIndex::new(&[]),
            residuals: Vec::new(),
            neighbors: 0,
        }
    }
}

impl FrameStep for IcpStep {
    #[allow(clippy::cast_precision_loss)]
    fn displacement(&self, p: Vec3) -> Vec3 {
        let near = self.sources.nearest_n(p, self.neighbors);
        if near.is_empty() {
            return self.translation;
        }
        let local = near.iter().map(|&i| self.residuals[i]).sum::<Vec3>() / near.len() as f32;
        self.translation + local
    }
}

/// Every `step`-th point so that at most `max_points` remain.
fn subsample(points: &[Vec3], max_points: usize) -> Vec<Vec3> {
    if max_points == 0 || points.len() <= max_points {
        return points.to_vec();
    }
    let step = points.len().div_ceil(max_points);
    points.iter().step_by(step).copied().collect()
}

fn closest(targets: &[Vec3], index: &PointIndex, p: Vec3) -> Vec3 {
    index.nearest(p).map_or(p, |(i, _)| targets[i])
}

#[allow(clippy::cast_precision_loss)]
fn centroid(points: &[Vec3]) -> Vec3 {
    points.iter().copied().sum::<Vec3>() / points.len() as f32
}

impl TranslationIcpEngine {
    /// Creates an engine with no frames loaded.
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            clouds: Vec::new(),
            neighbors: 0,
            steps: Vec::new(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn fit_step(&self, source: &[Vec3], target: &[Vec3], iterations: usize, tolerance: f32) -> IcpStep {
        if source.is_empty() || target.is_empty() {
            log::warn!("icp: empty frame, assuming no motion");
            return IcpStep::rigid(Vec3::ZERO);
        }

        let index = PointIndex::new(target);
        let mut translation = Vec3::ZERO;
        if self.settings.enable_rigid {
            translation = centroid(target) - centroid(source);
            for _ in 0..iterations {
                let shift = source
                    .iter()
                    .map(|&s| closest(target, &index, s + translation) - s)
                    .sum::<Vec3>()
                    / source.len() as f32;
                let change = shift.distance(translation);
                translation = shift;
                if change < tolerance {
                    break;
                }
            }
        }

        if !self.settings.enable_nonrigid {
            return IcpStep::rigid(translation);
        }

        let residuals = source
            .iter()
            .map(|&s| {
                let moved = s + translation;
                closest(target, &index, moved) - moved
            })
            .collect();
        IcpStep {
            translation,
            sources: PointIndex::new(source),
            residuals,
            neighbors: self.neighbors,
        }
    }
}

impl RegistrationEngine for TranslationIcpEngine {
    fn name(&self) -> &'static str {
        "icp"
    }

    fn add_frames(&mut self, frames: &MeshSequence) -> Result<()> {
        self.clouds = frames.frames().iter().map(|f| f.vertices().to_vec()).collect();
        self.steps.clear();
        Ok(())
    }

    fn load_landmarks(&mut self, name: &str, _landmarks: &LandmarkSet) -> Result<()> {
        log::debug!("icp: ignoring landmark set '{name}', registration is marker-free");
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn fit(&mut self, params: &FitParams) -> Result<()> {
        let max_points = param(params, "max_points", DEFAULT_MAX_POINTS);
        let iterations = param(params, "iterations", DEFAULT_ITERATIONS);
        let tolerance = param(params, "tolerance", DEFAULT_TOLERANCE);
        let neighbors = param(params, "neighbors", DEFAULT_NEIGHBORS);
        if [max_points, iterations, tolerance, neighbors]
            .iter()
            .any(|v| !(v.is_finite() && *v >= 0.0))
        {
            return Err(Track4dError::InvalidConfig(
                "icp parameters must be finite and non-negative".to_string(),
            ));
        }
        self.neighbors = neighbors as usize;

        let clouds: Vec<Vec<Vec3>> = self
            .clouds
            .iter()
            .map(|c| subsample(c, max_points as usize))
            .collect();
        self.steps = clouds
            .windows(2)
            .map(|pair| self.fit_step(&pair[0], &pair[1], iterations as usize, tolerance as f32))
            .collect();
        log::debug!(
            "icp: fitted {} steps on at most {} points per frame",
            self.steps.len(),
            max_points
        );
        Ok(())
    }

    fn query(&mut self, point: Vec3, start_frame: usize) -> Result<Vec<Option<Vec3>>> {
        propagate(&self.steps, self.clouds.len(), point, start_frame)
    }

    fn frame_count(&self) -> usize {
        self.clouds.len()
    }
}

#[cfg(test)]
mod tests {
    use track4d_core::TimeAxis;
    use track4d_structures::MeshFrame;

    use super::*;

    fn shifted_grids(offsets: &[Vec3]) -> MeshSequence {
        let axis = TimeAxis::new(0.0, 10.0, offsets.len()).unwrap();
        let frames = offsets
            .iter()
            .map(|&o| {
                let vertices = (0..6)
                    .flat_map(|y| (0..6).map(move |x| Vec3::new(x as f32, y as f32, 0.0)))
                    .map(|v| v * 10.0 + o)
                    .collect();
                MeshFrame::new("grid", vertices, Vec::new()).unwrap()
            })
            .collect();
        MeshSequence::new("seq", frames, axis).unwrap()
    }

    fn engine(settings: EngineSettings, seq: &MeshSequence) -> TranslationIcpEngine {
        let mut engine = TranslationIcpEngine::new(settings);
        engine.add_frames(seq).unwrap();
        engine.fit(&FitParams::new()).unwrap();
        engine
    }

    #[test]
    fn test_identical_frames_do_not_move() {
        let seq = shifted_grids(&[Vec3::ZERO; 4]);
        let settings = EngineSettings {
            enable_rigid: true,
            ..EngineSettings::default()
        };
        let mut engine = engine(settings, &seq);
        let p = Vec3::new(12.0, 7.0, 0.0);
        let track = engine.query(p, 0).unwrap();
        assert!(track.iter().all(|q| *q == Some(p)));
    }

    #[test]
    fn test_recovers_small_translation() {
        let shift = Vec3::new(1.0, -2.0, 0.5);
        let seq = shifted_grids(&[Vec3::ZERO, shift, shift * 2.0]);
        let settings = EngineSettings {
            enable_rigid: true,
            enable_nonrigid: false,
            ..EngineSettings::default()
        };
        let mut engine = engine(settings, &seq);
        let track = engine.query(Vec3::new(20.0, 20.0, 0.0), 0).unwrap();
        assert!(track[2].unwrap().distance(Vec3::new(22.0, 16.0, 1.0)) < 1e-3);
    }

    #[test]
    fn test_local_residual_follows_nearest_sources() {
        // the right half of the grid bends up by one unit
        let flat = shifted_grids(&[Vec3::ZERO]).frames()[0].clone();
        let bent: Vec<Vec3> = flat
            .vertices()
            .iter()
            .map(|&v| if v.x > 25.0 { v + Vec3::Z } else { v })
            .collect();
        let axis = TimeAxis::new(0.0, 10.0, 2).unwrap();
        let seq = MeshSequence::new(
            "bend",
            vec![flat, MeshFrame::new("grid", bent, Vec::new()).unwrap()],
            axis,
        )
        .unwrap();
        let settings = EngineSettings {
            enable_rigid: false,
            enable_nonrigid: true,
            ..EngineSettings::default()
        };
        let mut engine = TranslationIcpEngine::new(settings);
        engine.add_frames(&seq).unwrap();
        let mut params = FitParams::new();
        params.insert("neighbors".to_string(), 4.0);
        engine.fit(&params).unwrap();

        let left = engine.query(Vec3::new(0.0, 20.0, 0.0), 0).unwrap();
        let right = engine.query(Vec3::new(50.0, 20.0, 0.0), 0).unwrap();
        assert!(left[1].unwrap().distance(Vec3::new(0.0, 20.0, 0.0)) < 1e-5);
        assert!(right[1].unwrap().distance(Vec3::new(50.0, 20.0, 1.0)) < 1e-5);
    }

    #[test]
    fn test_subsample_bounds_points() {
        let points = vec![Vec3::ZERO; 1001];
        assert!(subsample(&points, 100).len() <= 100);
        assert_eq!(subsample(&points, 0).len(), 1001);
    }

    #[test]
    fn test_query_before_fit_fails() {
        let seq = shifted_grids(&[Vec3::ZERO; 3]);
        let mut engine = TranslationIcpEngine::new(EngineSettings::default());
        engine.add_frames(&seq).unwrap();
        assert!(engine.query(Vec3::ZERO, 0).is_err());
    }
}
