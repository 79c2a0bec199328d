//! Virtual landmarks tracked from a synthetic point set.

use serde::{Deserialize, Serialize};
use track4d_core::{Interpolator, Result};
use track4d_structures::{DiffResult, LandmarkSet};

use super::VIRTUAL_TRACK;
use crate::tracking::TrackingAdapter;

/// Summary of the virtual-landmark evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualLandmarkSummary {
    /// Number of tracked points.
    pub points: usize,
    /// Number of frames they were tracked over.
    pub frames: usize,
    /// Error against the synthetic trajectories, when the synthetic set
    /// covers the whole run.
    pub ground_truth: Option<DiffResult>,
}

/// Tracks a synthetic landmark set from frame 0.
///
/// If every synthetic trajectory spans the run's time axis, its resampled
/// positions seed the tracking and serve as ground truth. Otherwise the
/// first sample of each marker seeds the tracking and the result is
/// qualitative only.
pub fn virtual_landmarks(
    adapter: &mut TrackingAdapter,
    source: &LandmarkSet,
    kernel: &dyn Interpolator,
) -> Result<(LandmarkSet, VirtualLandmarkSummary)> {
    let ground_truth = match source.resample(adapter.axis(), kernel) {
        Ok(resampled) => Some(resampled),
        Err(e) => {
            log::info!("virtual landmarks are qualitative only: {e}");
            None
        }
    };
    let seeds = match &ground_truth {
        Some(truth) => truth.frame_coords(0)?,
        None => source.first_coords(),
    };

    adapter.track(VIRTUAL_TRACK, &seeds, 0)?;
    let tracked = adapter.assemble(VIRTUAL_TRACK, 0)?;
    let diff = ground_truth
        .as_ref()
        .map(|truth| LandmarkSet::diff(&tracked, truth))
        .transpose()?;
    if let Some(diff) = &diff {
        log::info!("{VIRTUAL_TRACK}: {}", diff.stats.summary());
    }

    let summary = VirtualLandmarkSummary {
        points: seeds.len(),
        frames: adapter.axis().len,
        ground_truth: diff,
    };
    Ok((tracked, summary))
}
