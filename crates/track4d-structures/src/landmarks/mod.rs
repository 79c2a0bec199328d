//! Labelled landmark trajectories.
//!
//! A [`LandmarkSet`] holds one [`Marker`] per physical (or virtual) landmark. A
//! freshly loaded set is sampled at the native capture times, possibly
//! irregularly; after [resampling](LandmarkSet::resample) it carries a
//! [`TimeAxis`] and every marker has exactly one position per frame.

mod diff;
mod resample;
mod trace;

pub use diff::DiffResult;
pub use trace::TraceLengthResult;

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use track4d_core::{bounds_of, Interpolator, Result, Structure, TimeAxis, Track4dError};

/// A single labelled trajectory: positions at strictly increasing times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    name: String,
    times: Vec<f64>,
    positions: Vec<Vec3>,
}

impl Marker {
    /// Creates a marker from `(time, position)` samples in any order.
    ///
    /// Fails on non-finite times or two samples sharing a timestamp.
    pub fn new(name: impl Into<String>, mut samples: Vec<(f64, Vec3)>) -> Result<Self> {
        let name = name.into();
        if let Some((t, _)) = samples.iter().find(|(t, _)| !t.is_finite()) {
            return Err(Track4dError::DataLoad(format!(
                "marker '{name}': non-finite sample time {t}"
            )));
        }
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));
        if let Some(pair) = samples.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(Track4dError::DataLoad(format!(
                "marker '{name}': duplicate sample time {}",
                pair[0].0
            )));
        }

        let (times, positions) = samples.into_iter().unzip();
        Ok(Self {
            name,
            times,
            positions,
        })
    }

    /// Creates a marker with one position per frame of `axis`.
    pub fn on_axis(name: impl Into<String>, axis: &TimeAxis, positions: Vec<Vec3>) -> Result<Self> {
        let name = name.into();
        if positions.len() != axis.len {
            return Err(Track4dError::DataLoad(format!(
                "marker '{name}': {} positions on a time axis of {} frames",
                positions.len(),
                axis.len
            )));
        }
        Ok(Self {
            name,
            times: axis.times(),
            positions,
        })
    }

    /// Returns the marker name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the sample times.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Returns the sample positions.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if the marker has no samples.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Returns the first and last sample times.
    pub fn span(&self) -> Option<(f64, f64)> {
        Some((*self.times.first()?, *self.times.last()?))
    }

    /// Evaluates the trajectory at time `t` with the given kernel.
    pub fn position_at(&self, t: f64, kernel: &dyn Interpolator) -> Option<Vec3> {
        kernel.interpolate(&self.times, &self.positions, t)
    }
}

/// A named collection of markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSet {
    name: String,
    markers: BTreeMap<String, Marker>,
    axis: Option<TimeAxis>,
}

impl LandmarkSet {
    /// Creates a set sampled at native (possibly irregular) times.
    pub fn new(name: impl Into<String>, markers: Vec<Marker>) -> Result<Self> {
        let name = name.into();
        let mut map = BTreeMap::new();
        for marker in markers {
            let marker_name = marker.name.clone();
            if map.insert(marker_name.clone(), marker).is_some() {
                return Err(Track4dError::DataLoad(format!(
                    "landmark set '{name}': duplicate marker '{marker_name}'"
                )));
            }
        }
        Ok(Self {
            name,
            markers: map,
            axis: None,
        })
    }

    /// Creates a regular set with one position per marker per frame of `axis`.
    pub fn from_frames(
        name: impl Into<String>,
        axis: TimeAxis,
        tracks: Vec<(String, Vec<Vec3>)>,
    ) -> Result<Self> {
        let markers = tracks
            .into_iter()
            .map(|(label, positions)| Marker::on_axis(label, &axis, positions))
            .collect::<Result<Vec<_>>>()?;
        let mut set = Self::new(name, markers)?;
        set.axis = Some(axis);
        Ok(set)
    }

    /// Returns the set name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a copy of this set under another name.
    #[must_use]
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the number of markers.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Returns true if the set has no markers.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Returns the marker names in order.
    pub fn marker_names(&self) -> impl Iterator<Item = &str> {
        self.markers.keys().map(String::as_str)
    }

    /// Returns the markers in name order.
    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.markers.values()
    }

    /// Gets a marker by name.
    pub fn marker(&self, name: &str) -> Result<&Marker> {
        self.markers
            .get(name)
            .ok_or_else(|| Track4dError::MarkerNotFound(name.to_string()))
    }

    /// Returns the frame axis, present once the set has been resampled.
    pub fn axis(&self) -> Option<TimeAxis> {
        self.axis
    }

    /// Returns the number of frames of a resampled set.
    pub fn frame_count(&self) -> Option<usize> {
        self.axis.map(|a| a.len)
    }

    fn require_axis(&self) -> Result<TimeAxis> {
        self.axis.ok_or_else(|| {
            Track4dError::SchemaMismatch(format!(
                "landmark set '{}' has no frame axis, resample it first",
                self.name
            ))
        })
    }

    /// Returns every marker's position at frame `frame` of a resampled set.
    pub fn frame_coords(&self, frame: usize) -> Result<Vec<(String, Vec3)>> {
        let axis = self.require_axis()?;
        if frame >= axis.len {
            return Err(Track4dError::FrameOutOfRange {
                frame,
                len: axis.len,
            });
        }
        Ok(self
            .markers
            .values()
            .map(|m| (m.name.clone(), m.positions[frame]))
            .collect())
    }

    /// Returns the interpolated position at time `t` of every marker defined there.
    pub fn time_coords(&self, t: f64, kernel: &dyn Interpolator) -> Vec<(String, Vec3)> {
        self.markers
            .values()
            .filter_map(|m| Some((m.name.clone(), m.position_at(t, kernel)?)))
            .collect()
    }

    /// Returns every marker's first native sample.
    ///
    /// Markers without samples are skipped.
    pub fn first_coords(&self) -> Vec<(String, Vec3)> {
        self.markers
            .values()
            .filter_map(|m| Some((m.name.clone(), *m.positions.first()?)))
            .collect()
    }

    /// Returns the subset of markers named in `names`.
    pub fn extract<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let mut markers = BTreeMap::new();
        for name in names {
            let marker = self.marker(name.as_ref())?;
            markers.insert(marker.name.clone(), marker.clone());
        }
        Ok(Self {
            name: self.name.clone(),
            markers,
            axis: self.axis,
        })
    }

    /// Returns the frames `start..start + len` of a resampled set.
    pub fn window(&self, start: usize, len: usize) -> Result<Self> {
        let axis = self.require_axis()?.window(start, len)?;
        let markers = self
            .markers
            .iter()
            .map(|(name, m)| {
                let marker = Marker {
                    name: m.name.clone(),
                    times: m.times[start..start + len].to_vec(),
                    positions: m.positions[start..start + len].to_vec(),
                };
                (name.clone(), marker)
            })
            .collect();
        Ok(Self {
            name: self.name.clone(),
            markers,
            axis: Some(axis),
        })
    }
}

impl Structure for LandmarkSet {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        "LandmarkSet"
    }

    fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        bounds_of(self.markers.values().flat_map(|m| m.positions.iter()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A regular set of markers that never move.
    pub(crate) fn static_set(name: &str, axis: TimeAxis, points: &[Vec3]) -> LandmarkSet {
        let tracks = points
            .iter()
            .enumerate()
            .map(|(i, p)| (format!("marker {i}"), vec![*p; axis.len]))
            .collect();
        LandmarkSet::from_frames(name, axis, tracks).unwrap()
    }

    #[test]
    fn test_marker_sorts_samples() {
        let m = Marker::new("m", vec![(1.0, Vec3::X), (0.0, Vec3::ZERO)]).unwrap();
        assert_eq!(m.times(), &[0.0, 1.0]);
        assert_eq!(m.positions(), &[Vec3::ZERO, Vec3::X]);
    }

    #[test]
    fn test_marker_rejects_duplicate_time() {
        let err = Marker::new("m", vec![(1.0, Vec3::X), (1.0, Vec3::Y)]).unwrap_err();
        assert!(matches!(err, Track4dError::DataLoad(_)));
    }

    #[test]
    fn test_duplicate_marker_rejected() {
        let a = Marker::new("m", vec![(0.0, Vec3::X)]).unwrap();
        assert!(LandmarkSet::new("s", vec![a.clone(), a]).is_err());
    }

    #[test]
    fn test_extract_unknown_marker() {
        let axis = TimeAxis::new(0.0, 10.0, 3).unwrap();
        let set = static_set("s", axis, &[Vec3::ZERO, Vec3::X]);
        let sub = set.extract(&["marker 1"]).unwrap();
        assert_eq!(sub.len(), 1);
        assert_eq!(sub.frame_count(), Some(3));
        assert!(matches!(
            set.extract(&["marker 9"]),
            Err(Track4dError::MarkerNotFound(_))
        ));
    }

    #[test]
    fn test_frame_coords_requires_axis() {
        let m = Marker::new("m", vec![(0.0, Vec3::X), (1.0, Vec3::Y)]).unwrap();
        let set = LandmarkSet::new("raw", vec![m]).unwrap();
        assert!(matches!(
            set.frame_coords(0),
            Err(Track4dError::SchemaMismatch(_))
        ));
        assert_eq!(set.first_coords(), vec![("m".to_string(), Vec3::X)]);
        let mid = set.time_coords(0.5, &track4d_core::Linear);
        assert_eq!(mid.len(), 1);
        assert!((mid[0].1 - Vec3::new(0.5, 0.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_window() {
        let axis = TimeAxis::new(0.0, 10.0, 6).unwrap();
        let set = static_set("s", axis, &[Vec3::ONE]);
        let win = set.window(2, 3).unwrap();
        assert_eq!(win.frame_count(), Some(3));
        assert!((win.axis().unwrap().start_time - 0.2).abs() < 1e-12);
        assert!(set.window(4, 3).is_err());
    }
}
