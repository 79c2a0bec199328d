//! Interpolation kernels for time-sampled 3D trajectories.
//!
//! A kernel evaluates a trajectory given as sorted `(time, position)` samples at
//! an arbitrary time inside the sampled span. Kernels never extrapolate.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::time::TIME_EPSILON;

/// A field-interpolation capability over one trajectory.
pub trait Interpolator {
    /// Returns the kernel name.
    fn name(&self) -> &'static str;

    /// Evaluates the trajectory at time `t`.
    ///
    /// `times` must be strictly increasing and the same length as `values`.
    /// Returns `None` when `t` lies outside `[times[0], times[last]]` or fewer
    /// than two samples are given.
    fn interpolate(&self, times: &[f64], values: &[Vec3], t: f64) -> Option<Vec3>;
}

/// Locates the segment `[i, i + 1]` containing `t`.
///
/// Returns `Ok(i)` when `t` coincides with sample `i`, `Err(i)` when it lies
/// strictly inside segment `i`, and `None` when it is out of span.
fn locate(times: &[f64], t: f64) -> Option<std::result::Result<usize, usize>> {
    let (first, last) = (*times.first()?, *times.last()?);
    if times.len() < 2 || t < first - TIME_EPSILON || t > last + TIME_EPSILON {
        return None;
    }

    let upper = times.partition_point(|&s| s <= t);
    if upper > 0 && (t - times[upper - 1]).abs() < TIME_EPSILON {
        return Some(Ok(upper - 1));
    }
    if upper < times.len() && (times[upper] - t).abs() < TIME_EPSILON {
        return Some(Ok(upper));
    }
    // t is strictly between two samples here
    Some(Err(upper - 1))
}

/// Piecewise-linear interpolation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Linear;

impl Interpolator for Linear {
    fn name(&self) -> &'static str {
        "linear"
    }

    #[allow(clippy::cast_possible_truncation)]
    fn interpolate(&self, times: &[f64], values: &[Vec3], t: f64) -> Option<Vec3> {
        match locate(times, t)? {
            Ok(i) => values.get(i).copied(),
            Err(i) => {
                let s = ((t - times[i]) / (times[i + 1] - times[i])) as f32;
                Some(values[i].lerp(values[i + 1], s))
            }
        }
    }
}

/// Uniform Catmull-Rom spline through the samples.
///
/// The curve passes through every sample; end segments duplicate the
/// endpoint as the missing neighbour.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatmullRom;

impl Interpolator for CatmullRom {
    fn name(&self) -> &'static str {
        "catmull-rom"
    }

    #[allow(clippy::cast_possible_truncation)]
    fn interpolate(&self, times: &[f64], values: &[Vec3], t: f64) -> Option<Vec3> {
        match locate(times, t)? {
            Ok(i) => values.get(i).copied(),
            Err(i) => {
                let p0 = values[i.saturating_sub(1)];
                let p1 = values[i];
                let p2 = values[i + 1];
                let p3 = values[(i + 2).min(values.len() - 1)];
                let s = ((t - times[i]) / (times[i + 1] - times[i])) as f32;
                let s2 = s * s;
                let s3 = s2 * s;

                Some(
                    0.5 * ((2.0 * p1)
                        + (p2 - p0) * s
                        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * s2
                        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * s3),
                )
            }
        }
    }
}

/// Selectable interpolation kernel, as stored in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum InterpolationKind {
    /// Piecewise-linear.
    #[default]
    Linear,
    /// Uniform Catmull-Rom spline.
    CatmullRom,
}

impl InterpolationKind {
    /// Returns the kernel implementing this kind.
    pub fn kernel(self) -> &'static dyn Interpolator {
        match self {
            Self::Linear => &Linear,
            Self::CatmullRom => &CatmullRom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> (Vec<f64>, Vec<Vec3>) {
        let times = vec![0.0, 1.0, 2.0, 3.0];
        let values = times
            .iter()
            .map(|&t| Vec3::new(t as f32 * 2.0, 0.0, 1.0))
            .collect();
        (times, values)
    }

    #[test]
    fn test_linear_midpoint() {
        let (times, values) = ramp();
        let p = Linear.interpolate(&times, &values, 1.5).unwrap();
        assert!((p - Vec3::new(3.0, 0.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_exact_sample_returned() {
        let (times, values) = ramp();
        for kernel in [InterpolationKind::Linear, InterpolationKind::CatmullRom] {
            for (t, v) in times.iter().zip(&values) {
                assert_eq!(kernel.kernel().interpolate(&times, &values, *t), Some(*v));
            }
        }
    }

    #[test]
    fn test_out_of_span() {
        let (times, values) = ramp();
        assert!(Linear.interpolate(&times, &values, -0.1).is_none());
        assert!(CatmullRom.interpolate(&times, &values, 3.1).is_none());
    }

    #[test]
    fn test_single_sample_rejected() {
        assert!(Linear
            .interpolate(&[0.0], &[Vec3::ONE], 0.0)
            .is_none());
    }

    #[test]
    fn test_catmull_rom_reproduces_line() {
        let (times, values) = ramp();
        let p = CatmullRom.interpolate(&times, &values, 1.25).unwrap();
        assert!((p - Vec3::new(2.5, 0.0, 1.0)).length() < 1e-5);
    }
}
