//! Landmark-driven Gaussian RBF deformation.
//!
//! Between frames `k` and `k + 1` the landmark displacements are interpolated
//! with Gaussian radial basis functions centred on the landmarks at frame `k`.
//! The weights solve `(K + lambda I) W = D`.

use glam::Vec3;
use nalgebra::DMatrix;
use track4d_core::{Result, Track4dError};
use track4d_structures::{LandmarkSet, MeshSequence};

use super::{param, propagate, EngineSettings, FitParams, FrameStep, RegistrationEngine};

/// Default kernel width, in mesh units.
const DEFAULT_SIGMA: f64 = 40.0;
/// Default Tikhonov regularisation.
const DEFAULT_LAMBDA: f64 = 1e-6;

/// Marker-guided engine interpolating landmark motion with Gaussian RBFs.
pub struct LandmarkRbfEngine {
    settings: EngineSettings,
    frames: usize,
    landmarks: Option<LandmarkSet>,
    steps: Vec<RbfStep>,
}

struct RbfStep {
    translation: Vec3,
    centers: Vec<Vec3>,
    weights: Vec<Vec3>,
    inv_two_sigma_sq: f32,
}

impl FrameStep for RbfStep {
    fn displacement(&self, p: Vec3) -> Vec3 {
        self.centers
            .iter()
            .zip(&self.weights)
            .fold(self.translation, |acc, (&c, &w)| {
                acc + w * (-p.distance_squared(c) * self.inv_two_sigma_sq).exp()
            })
    }
}

impl LandmarkRbfEngine {
    /// Creates an engine with no frames loaded.
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            frames: 0,
            landmarks: None,
            steps: Vec::new(),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn fit_step(
        &self,
        centers: &[Vec3],
        targets: &[Vec3],
        sigma: f64,
        lambda: f64,
    ) -> Result<RbfStep> {
        let n = centers.len();
        let displacements: Vec<Vec3> = centers.iter().zip(targets).map(|(&a, &b)| b - a).collect();

        let translation = if self.settings.enable_rigid && n > 0 {
            displacements.iter().copied().sum::<Vec3>() / n as f32
        } else {
            Vec3::ZERO
        };
        let inv_two_sigma_sq = 1.0 / (2.0 * sigma * sigma);

        if !self.settings.enable_nonrigid || n == 0 {
            return Ok(RbfStep {
                translation,
                centers: Vec::new(),
                weights: Vec::new(),
                inv_two_sigma_sq: inv_two_sigma_sq as f32,
            });
        }

        let kernel = DMatrix::<f64>::from_fn(n, n, |i, j| {
            let d2 = f64::from(centers[i].distance_squared(centers[j]));
            let diagonal = if i == j { lambda } else { 0.0 };
            (-d2 * inv_two_sigma_sq).exp() + diagonal
        });
        let rhs = DMatrix::<f64>::from_fn(n, 3, |i, axis| {
            f64::from((displacements[i] - translation)[axis])
        });
        let solution = kernel.lu().solve(&rhs).ok_or_else(|| {
            Track4dError::Registration(format!(
                "RBF system is singular for {n} landmarks (sigma = {sigma}, lambda = {lambda})"
            ))
        })?;

        let weights = (0..n)
            .map(|i| {
                Vec3::new(
                    solution[(i, 0)] as f32,
                    solution[(i, 1)] as f32,
                    solution[(i, 2)] as f32,
                )
            })
            .collect();

        Ok(RbfStep {
            translation,
            centers: centers.to_vec(),
            weights,
            inv_two_sigma_sq: inv_two_sigma_sq as f32,
        })
    }
}

impl RegistrationEngine for LandmarkRbfEngine {
    fn name(&self) -> &'static str {
        "rbf"
    }

    fn add_frames(&mut self, frames: &MeshSequence) -> Result<()> {
        self.frames = frames.len();
        self.steps.clear();
        Ok(())
    }

    fn load_landmarks(&mut self, name: &str, landmarks: &LandmarkSet) -> Result<()> {
        log::debug!("rbf: loaded landmark set '{name}' ({} markers)", landmarks.len());
        self.landmarks = Some(landmarks.clone());
        self.steps.clear();
        Ok(())
    }

    fn fit(&mut self, params: &FitParams) -> Result<()> {
        let sigma = param(params, "sigma", DEFAULT_SIGMA);
        let lambda = param(params, "lambda", DEFAULT_LAMBDA);
        if !(sigma.is_finite() && sigma > 0.0) || !(lambda.is_finite() && lambda >= 0.0) {
            return Err(Track4dError::InvalidConfig(format!(
                "rbf needs sigma > 0 and lambda >= 0, got sigma = {sigma}, lambda = {lambda}"
            )));
        }

        let landmarks = self.landmarks.as_ref().ok_or_else(|| {
            Track4dError::Registration("rbf requires a landmark set".to_string())
        })?;
        if landmarks.frame_count() != Some(self.frames) {
            return Err(Track4dError::Registration(format!(
                "landmark set '{}' covers {:?} frames, mesh sequence has {}",
                landmarks.name(),
                landmarks.frame_count(),
                self.frames
            )));
        }

        let mut steps = Vec::with_capacity(self.frames.saturating_sub(1));
        let mut current = landmarks.frame_coords(0)?;
        for k in 1..self.frames {
            let next = landmarks.frame_coords(k)?;
            let centers: Vec<Vec3> = current.iter().map(|(_, p)| *p).collect();
            let targets: Vec<Vec3> = next.iter().map(|(_, p)| *p).collect();
            steps.push(self.fit_step(&centers, &targets, sigma, lambda)?);
            current = next;
        }
        log::debug!(
            "rbf: fitted {} steps over {} landmarks",
            steps.len(),
            landmarks.len()
        );
        self.steps = steps;
        Ok(())
    }

    fn query(&mut self, point: Vec3, start_frame: usize) -> Result<Vec<Option<Vec3>>> {
        propagate(&self.steps, self.frames, point, start_frame)
    }

    fn frame_count(&self) -> usize {
        self.frames
    }
}
