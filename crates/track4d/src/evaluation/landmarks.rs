//! Control and non-control landmark accuracy.

use track4d_core::Result;
use track4d_structures::{DiffResult, LandmarkSet};

use crate::tracking::TrackingAdapter;

/// Tracks the frame-0 landmark positions through the engine under
/// `track_name` and compares the result with the landmarks themselves.
pub fn landmark_accuracy(
    adapter: &mut TrackingAdapter,
    landmarks: &LandmarkSet,
    track_name: &str,
) -> Result<(LandmarkSet, DiffResult)> {
    let seeds = landmarks.frame_coords(0)?;
    adapter.track(track_name, &seeds, 0)?;
    let tracked = adapter.assemble(track_name, 0)?;
    let diff = LandmarkSet::diff(&tracked, landmarks)?;
    for name in diff.errors.keys() {
        if let Some(stats) = diff.marker_stats(name) {
            log::debug!("{track_name} '{name}': {}", stats.summary());
        }
    }
    Ok((tracked, diff))
}
