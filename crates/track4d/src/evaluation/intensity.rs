//! Deformation intensity: how far points sampled on the surface travel.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use track4d_core::{IntensityOptions, Result, Track4dError};
use track4d_structures::{MeshSequence, TraceLengthResult};

use super::INTENSITY_TRACK;
use crate::tracking::TrackingAdapter;

/// Result of the deformation-intensity evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeformationIntensity {
    /// Frame the points were sampled on.
    pub reference_frame: usize,
    /// Path length of every sampled point from the reference frame on.
    pub trace: TraceLengthResult,
}

/// Samples points on the reference frame's surface, tracks them to the end of
/// the sequence, and measures how far each travelled.
///
/// The reference frame is clamped to the last frame. Sampling is seeded, so
/// repeated runs pick the same points.
pub fn deformation_intensity(
    adapter: &mut TrackingAdapter,
    meshes: &MeshSequence,
    options: &IntensityOptions,
) -> Result<DeformationIntensity> {
    let reference_frame = options.reference_frame.min(meshes.len().saturating_sub(1));
    if reference_frame != options.reference_frame {
        log::warn!(
            "reference frame {} is past the end, using frame {reference_frame}",
            options.reference_frame
        );
    }

    let mesh = meshes.frame(reference_frame)?;
    let mut rng = StdRng::seed_from_u64(options.seed);
    let points = mesh.sample_points(options.sample_count, &mut rng);
    if points.is_empty() {
        return Err(Track4dError::DataLoad(format!(
            "reference frame {reference_frame} has no geometry to sample"
        )));
    }
    let seeds: Vec<_> = points
        .into_iter()
        .enumerate()
        .map(|(i, p)| (format!("{INTENSITY_TRACK} {i:04}"), p))
        .collect();

    adapter.track(INTENSITY_TRACK, &seeds, reference_frame)?;
    let tracked = adapter.assemble(INTENSITY_TRACK, reference_frame)?;
    let trace = tracked.trace_length(0)?;
    Ok(DeformationIntensity {
        reference_frame,
        trace,
    })
}
