//! Per-marker, per-frame distance between two landmark sets.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use track4d_core::{Result, Track4dError};

use super::LandmarkSet;
use crate::stats::ErrorStats;

/// Euclidean error of every marker at every frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Number of frames compared.
    pub frames: usize,

    /// Error per frame, keyed by marker name.
    pub errors: BTreeMap<String, Vec<f32>>,

    /// Statistics over all markers and frames.
    pub stats: ErrorStats,
}

impl DiffResult {
    /// Statistics of a single marker over all frames.
    pub fn marker_stats(&self, name: &str) -> Option<ErrorStats> {
        self.errors.get(name).map(|e| ErrorStats::from_values(e))
    }

    /// Largest error over all markers and frames.
    pub fn max_error(&self) -> f32 {
        self.stats.max
    }
}

impl LandmarkSet {
    /// Compares two resampled sets marker by marker, frame by frame.
    ///
    /// Both sets must carry a frame axis with the same number of frames and
    /// contain exactly the same marker names; any disagreement fails with
    /// [`Track4dError::SchemaMismatch`]. The result depends only on distances,
    /// so `diff(a, b)` and `diff(b, a)` agree.
    pub fn diff(a: &LandmarkSet, b: &LandmarkSet) -> Result<DiffResult> {
        let a_frames = a.require_axis()?.len;
        let b_frames = b.require_axis()?.len;
        if a_frames != b_frames {
            return Err(Track4dError::SchemaMismatch(format!(
                "'{}' has {a_frames} frames, '{}' has {b_frames}",
                a.name, b.name
            )));
        }

        let a_names: BTreeSet<&str> = a.marker_names().collect();
        let b_names: BTreeSet<&str> = b.marker_names().collect();
        if a_names != b_names {
            let only_a: Vec<_> = a_names.difference(&b_names).collect();
            let only_b: Vec<_> = b_names.difference(&a_names).collect();
            return Err(Track4dError::SchemaMismatch(format!(
                "marker names differ: only in '{}': {only_a:?}, only in '{}': {only_b:?}",
                a.name, b.name
            )));
        }

        let errors: BTreeMap<String, Vec<f32>> = a
            .markers
            .iter()
            .map(|(name, ma)| {
                let mb = &b.markers[name];
                let e = ma
                    .positions
                    .iter()
                    .zip(&mb.positions)
                    .map(|(p, q)| p.distance(*q))
                    .collect();
                (name.clone(), e)
            })
            .collect();

        let all: Vec<f32> = errors.values().flatten().copied().collect();
        Ok(DiffResult {
            frames: a_frames,
            stats: ErrorStats::from_values(&all),
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use proptest::prelude::*;
    use track4d_core::TimeAxis;

    use super::*;
    use crate::landmarks::tests::static_set;

    #[test]
    fn test_identical_sets_zero_error() {
        let axis = TimeAxis::new(0.0, 10.0, 4).unwrap();
        let a = static_set("a", axis, &[Vec3::ZERO, Vec3::X]);
        let d = LandmarkSet::diff(&a, &a).unwrap();
        assert_eq!(d.frames, 4);
        assert_eq!(d.stats.count, 8);
        assert!(d.max_error() == 0.0);
    }

    #[test]
    fn test_offset_error() {
        let axis = TimeAxis::new(0.0, 10.0, 3).unwrap();
        let a = static_set("a", axis, &[Vec3::ZERO]);
        let b = static_set("b", axis, &[Vec3::new(3.0, 4.0, 0.0)]);
        let d = LandmarkSet::diff(&a, &b).unwrap();
        assert_eq!(d.errors["marker 0"], vec![5.0; 3]);
        assert_eq!(d.marker_stats("marker 0").unwrap().count, 3);
        assert!(d.marker_stats("marker 9").is_none());
    }

    #[test]
    fn test_frame_count_mismatch() {
        let a = static_set("a", TimeAxis::new(0.0, 10.0, 3).unwrap(), &[Vec3::ZERO]);
        let b = static_set("b", TimeAxis::new(0.0, 10.0, 4).unwrap(), &[Vec3::ZERO]);
        assert!(matches!(
            LandmarkSet::diff(&a, &b),
            Err(Track4dError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_marker_name_mismatch() {
        let axis = TimeAxis::new(0.0, 10.0, 3).unwrap();
        let a = static_set("a", axis, &[Vec3::ZERO, Vec3::X]);
        let b = static_set("b", axis, &[Vec3::ZERO]);
        assert!(matches!(
            LandmarkSet::diff(&a, &b),
            Err(Track4dError::SchemaMismatch(_))
        ));
    }

    fn point() -> impl Strategy<Value = Vec3> {
        (-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0)
            .prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    proptest! {
        #[test]
        fn prop_diff_symmetric(
            pts in prop::collection::vec((point(), point()), 1..6),
            frames in 1usize..8,
        ) {
            let axis = TimeAxis::new(0.0, 10.0, frames).unwrap();
            let tracks = |pick: fn(&(Vec3, Vec3)) -> Vec3| {
                pts.iter()
                    .enumerate()
                    .map(|(i, pair)| (format!("m{i}"), vec![pick(pair); frames]))
                    .collect::<Vec<_>>()
            };
            let a = LandmarkSet::from_frames("a", axis, tracks(|p| p.0)).unwrap();
            let b = LandmarkSet::from_frames("b", axis, tracks(|p| p.1)).unwrap();
            let ab = LandmarkSet::diff(&a, &b).unwrap();
            let ba = LandmarkSet::diff(&b, &a).unwrap();
            prop_assert_eq!(ab.errors, ba.errors);
        }
    }
}
