//! Temporal resampling of landmark trajectories onto a regular frame axis.

use track4d_core::{Interpolator, Result, TimeAxis, Track4dError, TIME_EPSILON};

use super::{LandmarkSet, Marker};

impl LandmarkSet {
    /// Fails with [`Track4dError::InsufficientSamples`] if any marker cannot be
    /// interpolated.
    fn check_samples(&self) -> Result<()> {
        if self.markers.is_empty() {
            return Err(Track4dError::DataLoad(format!(
                "landmark set '{}' has no markers",
                self.name
            )));
        }
        match self.markers.values().find(|m| m.len() < 2) {
            Some(m) => Err(Track4dError::InsufficientSamples {
                marker: m.name.clone(),
                count: m.len(),
            }),
            None => Ok(()),
        }
    }

    /// Returns the time span covered by every marker.
    pub fn common_span(&self) -> Option<(f64, f64)> {
        self.markers
            .values()
            .map(Marker::span)
            .try_fold((f64::NEG_INFINITY, f64::INFINITY), |(lo, hi), span| {
                let (first, last) = span?;
                Some((lo.max(first), hi.min(last)))
            })
            .filter(|(lo, hi)| lo <= hi)
    }

    /// Resamples every marker onto `axis`.
    ///
    /// Each output frame holds exactly one position per marker. Resampling a set
    /// onto the axis it already carries returns the same coordinates.
    pub fn resample(&self, axis: TimeAxis, kernel: &dyn Interpolator) -> Result<Self> {
        self.check_samples()?;

        let times = axis.times();
        let mut tracks = Vec::with_capacity(self.markers.len());
        for marker in self.markers.values() {
            let positions = times
                .iter()
                .enumerate()
                .map(|(frame, &t)| {
                    marker.position_at(t, kernel).ok_or_else(|| {
                        Track4dError::DataLoad(format!(
                            "marker '{}' has no samples around t = {t:.4} s (frame {frame})",
                            marker.name
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            tracks.push((marker.name.clone(), positions));
        }

        log::debug!(
            "resampled '{}' ({} markers) onto {} frames at {} fps with {} kernel",
            self.name,
            tracks.len(),
            axis.len,
            axis.fps,
            kernel.name()
        );
        Self::from_frames(self.name.clone(), axis, tracks)
    }

    /// Resamples at `fps` over the span common to all markers.
    ///
    /// Output frames sit at `anchor + k / fps` for integer `k`; the first one is
    /// the earliest such time not before the common span, the last the latest
    /// one not after it.
    #[allow(clippy::cast_precision_loss)]
    pub fn reslice(&self, fps: f64, anchor: f64, kernel: &dyn Interpolator) -> Result<Self> {
        self.check_samples()?;
        if !(fps.is_finite() && fps > 0.0) {
            return Err(Track4dError::InvalidConfig(format!(
                "fps must be positive, got {fps}"
            )));
        }
        let (first, last) = self.common_span().ok_or_else(|| {
            Track4dError::DataLoad(format!(
                "markers of '{}' share no common time span",
                self.name
            ))
        })?;

        // snap in seconds, within the span tolerance of the kernels
        let k0 = ((first - anchor - TIME_EPSILON / 2.0) * fps).ceil();
        let start = anchor + k0 / fps;
        let axis = TimeAxis::spanning(start, last, fps)?;
        self.resample(axis, kernel)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use proptest::prelude::*;
    use track4d_core::{CatmullRom, InterpolationKind, Linear};

    use super::*;

    /// One marker moving one unit along x per native frame at 10 fps.
    fn linear_marker(frames: usize) -> LandmarkSet {
        let samples = (0..frames)
            .map(|k| (k as f64 / 10.0, Vec3::new(k as f32, 0.0, 0.0)))
            .collect();
        let marker = Marker::new("marker 0", samples).unwrap();
        LandmarkSet::new("gt", vec![marker]).unwrap()
    }

    #[test]
    fn test_reslice_half_rate() {
        let set = linear_marker(10);
        let resliced = set.reslice(5.0, 0.0, &Linear).unwrap();
        assert_eq!(resliced.frame_count(), Some(5));
        let xs: Vec<f32> = resliced
            .marker("marker 0")
            .unwrap()
            .positions()
            .iter()
            .map(|p| p.x)
            .collect();
        for (x, expected) in xs.iter().zip([0.0, 2.0, 4.0, 6.0, 8.0]) {
            assert!((x - expected).abs() < 1e-5, "{xs:?}");
        }
    }

    #[test]
    fn test_insufficient_samples() {
        let short = Marker::new("lonely", vec![(0.0, Vec3::ZERO)]).unwrap();
        let ok = Marker::new("ok", vec![(0.0, Vec3::ZERO), (1.0, Vec3::X)]).unwrap();
        let set = LandmarkSet::new("s", vec![ok, short]).unwrap();
        let err = set.reslice(10.0, 0.0, &Linear).unwrap_err();
        assert!(matches!(
            err,
            Track4dError::InsufficientSamples { ref marker, count: 1 } if marker == "lonely"
        ));
    }

    #[test]
    fn test_reslice_uses_common_span() {
        let a = Marker::new("a", vec![(0.0, Vec3::ZERO), (1.0, Vec3::X)]).unwrap();
        let b = Marker::new("b", vec![(0.25, Vec3::ZERO), (0.75, Vec3::Y)]).unwrap();
        let set = LandmarkSet::new("s", vec![a, b]).unwrap();
        let resliced = set.reslice(10.0, 0.0, &Linear).unwrap();
        let axis = resliced.axis().unwrap();
        assert!((axis.start_time - 0.3).abs() < 1e-9);
        assert_eq!(axis.len, 5);
    }

    #[test]
    fn test_reslice_single_precision_timestamps() {
        // capture clocks stored as f32 land a hair after the 120 fps grid
        let sampled = |name: &str, frames: std::ops::RangeInclusive<u16>| {
            let samples = frames
                .map(|k| (f64::from(f32::from(k) / 120.0), Vec3::new(f32::from(k), 0.0, 0.0)))
                .collect();
            Marker::new(name, samples).unwrap()
        };
        let a = Marker::new(
            "a",
            (0..=36).map(|k| (f64::from(k) / 120.0, Vec3::ZERO)).collect(),
        )
        .unwrap();
        let set = LandmarkSet::new("s", vec![a, sampled("b", 12..=36)]).unwrap();
        let (first, _) = set.common_span().unwrap();
        assert!(first > 0.1);

        let resliced = set.reslice(10.0, 0.0, &Linear).unwrap();
        let axis = resliced.axis().unwrap();
        assert!(axis.start_time >= first - TIME_EPSILON);
        assert!((axis.start_time - 0.2).abs() < 1e-9);
        assert_eq!(axis.len, 2);
        for frame in 0..axis.len {
            assert_eq!(resliced.frame_coords(frame).unwrap().len(), 2);
        }
    }

    #[test]
    fn test_reslice_snaps_onto_grid_within_tolerance() {
        let a = Marker::new("a", vec![(0.1 + 1e-10, Vec3::ZERO), (0.5, Vec3::X)]).unwrap();
        let set = LandmarkSet::new("s", vec![a]).unwrap();
        let axis = set.reslice(10.0, 0.0, &Linear).unwrap().axis().unwrap();
        assert!((axis.start_time - 0.1).abs() < 1e-9);
        assert_eq!(axis.len, 5);
    }

    #[test]
    fn test_resample_outside_span_fails() {
        let set = linear_marker(5);
        let axis = TimeAxis::new(0.0, 10.0, 8).unwrap();
        assert!(matches!(
            set.resample(axis, &Linear),
            Err(Track4dError::DataLoad(_))
        ));
    }

    #[test]
    fn test_every_frame_defined() {
        let set = linear_marker(13);
        let resliced = set.reslice(4.0, 0.0, &CatmullRom).unwrap();
        let n = resliced.frame_count().unwrap();
        for frame in 0..n {
            assert_eq!(resliced.frame_coords(frame).unwrap().len(), 1);
        }
    }

    fn jittered_set() -> impl Strategy<Value = LandmarkSet> {
        (
            prop::collection::vec((0.01f64..0.2, -50.0f32..50.0, -50.0f32..50.0), 2..20),
            prop::collection::vec((0.01f64..0.2, -50.0f32..50.0, -50.0f32..50.0), 2..20),
        )
            .prop_map(|(a, b)| {
                let build = |name: &str, steps: Vec<(f64, f32, f32)>| {
                    let mut t = 0.0;
                    let samples = steps
                        .into_iter()
                        .map(|(dt, x, y)| {
                            let sample = (t, Vec3::new(x, y, 0.0));
                            t += dt;
                            sample
                        })
                        .collect();
                    Marker::new(name, samples).unwrap()
                };
                LandmarkSet::new("p", vec![build("a", a), build("b", b)]).unwrap()
            })
    }

    proptest! {
        #[test]
        fn prop_reslice_idempotent(
            set in jittered_set(),
            fps in 5.0f64..60.0,
            spline in any::<bool>(),
        ) {
            let kind = if spline { InterpolationKind::CatmullRom } else { InterpolationKind::Linear };
            let once = set.reslice(fps, 0.0, kind.kernel()).unwrap();
            // a single frame cannot be resliced again
            prop_assume!(once.frame_count().unwrap_or(0) >= 2);
            let twice = once.reslice(fps, 0.0, kind.kernel()).unwrap();
            prop_assert_eq!(once.frame_count(), twice.frame_count());
            for (a, b) in once.markers().zip(twice.markers()) {
                for (p, q) in a.positions().iter().zip(b.positions()) {
                    prop_assert!(p.distance(*q) < 1e-4);
                }
            }
        }
    }
}
