//! Configuration options for a benchmark run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, Track4dError};
use crate::interpolation::InterpolationKind;

/// Native capture rate of the multi-camera rig, in frames per second.
pub const DEFAULT_ORIGIN_FPS: f64 = 120.0;

/// Markers bounding the tracked surface region.
pub const DEFAULT_CONTOUR_MARKERS: [&str; 6] = [
    "marker 0",
    "marker 2",
    "marker 3",
    "marker 14",
    "marker 15",
    "marker 17",
];

/// Top-level configuration of one benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Registered approach name (key into the approach table).
    pub approach: String,

    /// Whether to produce visual artifacts (heat maps, overview renders).
    pub plot: bool,

    /// Whether to export animations and the final report.
    pub export: bool,

    /// Folder receiving every exported artifact.
    pub export_folder: PathBuf,

    /// Folder holding the mesh sequence.
    pub mesh_path: PathBuf,

    /// Ground-truth landmark file.
    pub landmark_path: PathBuf,

    /// Synthetic landmark file for the virtual-landmark evaluation.
    pub test_landmark_path: PathBuf,

    /// Frames of the native capture to load.
    pub window: FrameWindow,

    /// Native capture rate.
    pub origin_fps: f64,

    /// Kernel used when resampling landmark trajectories.
    pub interpolation: InterpolationKind,

    /// Region-of-interest extraction settings.
    pub crop: CropOptions,

    /// Which evaluations run.
    pub evaluations: EvaluationToggles,

    /// Deformation-intensity sampling settings.
    pub intensity: IntensityOptions,

    /// Options forwarded to the visualisation sink.
    pub display: DisplayOptions,

    /// Approach-specific registration parameters.
    pub fit_params: BTreeMap<String, f64>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            approach: "rbf".to_string(),
            plot: true,
            export: true,
            export_folder: PathBuf::from("output/12fps/rbf"),
            mesh_path: PathBuf::from("data/mesh"),
            landmark_path: PathBuf::from("data/landmark/landmark.json"),
            test_landmark_path: PathBuf::from("data/test/random_landmark.json"),
            window: FrameWindow::default(),
            origin_fps: DEFAULT_ORIGIN_FPS,
            interpolation: InterpolationKind::default(),
            crop: CropOptions::default(),
            evaluations: EvaluationToggles::default(),
            intensity: IntensityOptions::default(),
            display: DisplayOptions::default(),
            fit_params: BTreeMap::new(),
        }
    }
}

impl BenchmarkConfig {
    /// Loads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Track4dError::InvalidConfig(format!("{}: {e}", path.display()))
        })?;
        Self::from_json(&contents)
    }

    /// Parses a configuration from a JSON string.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Frame rate of the loaded sequence after striding.
    #[allow(clippy::cast_precision_loss)]
    pub fn fps(&self) -> f64 {
        self.origin_fps / self.window.stride.max(1) as f64
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.window.stride == 0 {
            return Err(Track4dError::InvalidConfig(
                "window.stride must be at least 1".to_string(),
            ));
        }
        if self.window.end <= self.window.start {
            return Err(Track4dError::InvalidConfig(format!(
                "window.end ({}) must be greater than window.start ({})",
                self.window.end, self.window.start
            )));
        }
        if !(self.origin_fps.is_finite() && self.origin_fps > 0.0) {
            return Err(Track4dError::InvalidConfig(format!(
                "origin_fps must be positive, got {}",
                self.origin_fps
            )));
        }
        if !(self.crop.margin.is_finite() && self.crop.margin >= 0.0) {
            return Err(Track4dError::InvalidConfig(format!(
                "crop.margin must be non-negative, got {}",
                self.crop.margin
            )));
        }
        if self.crop.contour.is_empty() {
            return Err(Track4dError::InvalidConfig(
                "crop.contour must name at least one marker".to_string(),
            ));
        }
        Ok(())
    }
}

/// Range of native frames to load: `start..end` stepping by `stride`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameWindow {
    /// First native frame (inclusive).
    pub start: usize,
    /// Last native frame (exclusive).
    pub end: usize,
    /// Step between loaded frames.
    pub stride: usize,
}

impl Default for FrameWindow {
    fn default() -> Self {
        Self {
            start: 0,
            end: 120,
            stride: 12,
        }
    }
}

impl FrameWindow {
    /// Native frame indices selected by this window.
    pub fn indices(&self) -> impl Iterator<Item = usize> {
        (self.start..self.end).step_by(self.stride.max(1))
    }
}

/// Which coordinates bound the region of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClipBound {
    /// Bound x and y; keep any z.
    #[default]
    Xy,
    /// Bound all three axes.
    Xyz,
}

/// Region-of-interest extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CropOptions {
    /// Names of the markers forming the contour.
    pub contour: Vec<String>,
    /// Clipping mode.
    pub clip_bound: ClipBound,
    /// Distance the contour bounds are grown by, in mesh units.
    pub margin: f32,
}

impl Default for CropOptions {
    fn default() -> Self {
        Self {
            contour: DEFAULT_CONTOUR_MARKERS
                .iter()
                .map(ToString::to_string)
                .collect(),
            clip_bound: ClipBound::Xy,
            margin: 30.0,
        }
    }
}

/// Toggles for the four evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationToggles {
    pub control: bool,
    pub noncontrol: bool,
    pub virtual_landmarks: bool,
    pub deformation_intensity: bool,
}

impl Default for EvaluationToggles {
    fn default() -> Self {
        Self {
            control: true,
            noncontrol: true,
            virtual_landmarks: true,
            deformation_intensity: true,
        }
    }
}

/// Deformation-intensity sampling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntensityOptions {
    /// Number of surface points to track.
    pub sample_count: usize,
    /// Frame the points are sampled on.
    pub reference_frame: usize,
    /// Seed of the sampling RNG.
    pub seed: u64,
}

impl Default for IntensityOptions {
    fn default() -> Self {
        Self {
            sample_count: 100,
            reference_frame: 1,
            seed: 0,
        }
    }
}

/// Display options handed to visualisation sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    /// Mesh opacity (0.0 = transparent, 1.0 = opaque).
    pub opacity: f32,
    /// Window size in pixels for overview renders.
    pub window_size: [u32; 2],
    /// Fixed colour-scale bounds; derived from data when `None`.
    pub color_bounds: Option<(f32, f32)>,
    /// Colour map used for scalar values.
    pub color_map: String,
    /// Offset between consecutive frames in stacked overviews.
    pub stack_dist: f32,
    /// Frames skipped between stacked overview frames; about a tenth of the
    /// sequence when `None`.
    pub frame_skip: Option<usize>,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            opacity: 0.5,
            window_size: [2000, 500],
            color_bounds: None,
            color_map: "viridis".to_string(),
            stack_dist: 500.0,
            frame_skip: None,
        }
    }
}
