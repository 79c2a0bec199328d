//! Visual artifacts of a run.
//!
//! Evaluations hand their results to a [`VisualSink`]. The benchmark never
//! depends on what the sink does with them: [`NullSink`] drops everything,
//! [`ArtifactSink`] writes trajectory files and coloured meshes to a folder.

mod artifact;
pub mod color_maps;

use glam::{Vec3, Vec4};
use track4d_core::{DisplayOptions, Linear, Result};
use track4d_structures::{LandmarkSet, MeshFrame, MeshSequence, PointIndex};

pub use artifact::ArtifactSink;
pub use color_maps::{ColorMap, ColorMapRegistry};

/// Consumer of the visual output of evaluations.
pub trait VisualSink {
    /// Receives tracked trajectories to animate, in display order.
    fn animate(&mut self, name: &str, sets: &[&LandmarkSet], options: &DisplayOptions) -> Result<()>;

    /// Receives a stacked overview of the sequence with keypoints.
    fn overview(
        &mut self,
        name: &str,
        meshes: &MeshSequence,
        sets: &[&LandmarkSet],
        options: &DisplayOptions,
    ) -> Result<()>;

    /// Receives a scalar value per sample point, to be painted onto `mesh`.
    fn heat_map(
        &mut self,
        name: &str,
        mesh: &MeshFrame,
        points: &[Vec3],
        values: &[f32],
        options: &DisplayOptions,
    ) -> Result<()>;
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl VisualSink for NullSink {
    fn animate(&mut self, _name: &str, _sets: &[&LandmarkSet], _options: &DisplayOptions) -> Result<()> {
        Ok(())
    }

    fn overview(
        &mut self,
        _name: &str,
        _meshes: &MeshSequence,
        _sets: &[&LandmarkSet],
        _options: &DisplayOptions,
    ) -> Result<()> {
        Ok(())
    }

    fn heat_map(
        &mut self,
        _name: &str,
        _mesh: &MeshFrame,
        _points: &[Vec3],
        _values: &[f32],
        _options: &DisplayOptions,
    ) -> Result<()> {
        Ok(())
    }
}

/// Transfers per-point values onto the vertices of `mesh`: each vertex takes
/// the value of its nearest point.
///
/// Points without a value count as zero.
pub fn vertex_values(mesh: &MeshFrame, points: &[Vec3], values: &[f32]) -> Vec<f32> {
    let index = PointIndex::new(points);
    mesh.vertices()
        .iter()
        .map(|&v| {
            index
                .nearest(v)
                .and_then(|(i, _)| values.get(i).copied())
                .unwrap_or(0.0)
        })
        .collect()
}

/// Geometry of a stacked overview: every `skip`-th frame shifted along x.
///
/// Colours carry an alpha channel; mesh vertices take the display opacity,
/// keypoints stay opaque.
pub struct Overview {
    pub vertices: Vec<Vec3>,
    pub colors: Vec<Vec4>,
    pub triangles: Vec<[u32; 3]>,
}

const MESH_COLOR: Vec3 = Vec3::new(0.8, 0.8, 0.8);
const KEYPOINT_COLOR: Vec4 = Vec4::new(0.9, 0.1, 0.1, 1.0);

/// Frames skipped between overview slots: the configured value, or a tenth
/// of the sequence rounded half to even.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]
pub fn overview_skip(frames: usize, options: &DisplayOptions) -> usize {
    options
        .frame_skip
        .unwrap_or_else(|| (frames as f64 / 10.0).round_ties_even() as usize)
        .max(1)
}

/// Lays out every `skip`-th frame of `meshes` side by side, `stack_dist`
/// apart, with the keypoint positions at each frame's time as loose vertices.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn stacked_overview(meshes: &MeshSequence, sets: &[&LandmarkSet], options: &DisplayOptions) -> Overview {
    let skip = overview_skip(meshes.len(), options);
    let mesh_color = MESH_COLOR.extend(options.opacity.clamp(0.0, 1.0));
    let axis = meshes.axis();

    let mut overview = Overview {
        vertices: Vec::new(),
        colors: Vec::new(),
        triangles: Vec::new(),
    };
    for (slot, (frame_index, frame)) in meshes.frames().iter().enumerate().step_by(skip).enumerate() {
        let offset = Vec3::X * options.stack_dist * slot as f32;
        let base = overview.vertices.len() as u32;
        overview
            .vertices
            .extend(frame.vertices().iter().map(|&v| v + offset));
        overview
            .colors
            .extend(std::iter::repeat(mesh_color).take(frame.num_vertices()));
        overview
            .triangles
            .extend(frame.triangles().iter().map(|t| t.map(|i| i + base)));

        let t = axis.time(frame_index);
        for set in sets {
            let coords = set.time_coords(t, &Linear);
            overview.vertices.extend(coords.iter().map(|(_, p)| *p + offset));
            overview
                .colors
                .extend(std::iter::repeat(KEYPOINT_COLOR).take(coords.len()));
        }
    }
    overview
}

#[cfg(test)]
mod tests {
    use track4d_core::TimeAxis;

    use super::*;

    fn triangle() -> MeshFrame {
        MeshFrame::new("tri", vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![[0, 1, 2]]).unwrap()
    }

    #[test]
    fn test_vertex_values_nearest_point() {
        let values = vertex_values(&triangle(), &[Vec3::ZERO, Vec3::new(1.0, 0.1, 0.0)], &[1.0, 5.0]);
        assert_eq!(values, vec![1.0, 5.0, 1.0]);
    }

    #[test]
    fn test_vertex_values_without_points() {
        assert_eq!(vertex_values(&triangle(), &[], &[]), vec![0.0; 3]);
    }

    #[test]
    fn test_stacked_overview_layout() {
        let axis = TimeAxis::new(0.0, 10.0, 4).unwrap();
        let meshes = MeshSequence::new("seq", vec![triangle(); 4], axis).unwrap();
        // keypoints only from frame 2 onwards
        let kp_axis = TimeAxis::new(0.2, 10.0, 2).unwrap();
        let keypoints =
            LandmarkSet::from_frames("kp", kp_axis, vec![("a".into(), vec![Vec3::Z; 2])]).unwrap();
        let options = DisplayOptions {
            frame_skip: Some(2),
            stack_dist: 100.0,
            ..DisplayOptions::default()
        };

        let overview = stacked_overview(&meshes, &[&keypoints], &options);
        // frames 0 and 2, one keypoint on frame 2
        assert_eq!(overview.vertices.len(), 7);
        assert_eq!(overview.triangles, vec![[0, 1, 2], [3, 4, 5]]);
        assert_eq!(overview.vertices[6], Vec3::new(100.0, 0.0, 1.0));
        assert_eq!(overview.colors.len(), overview.vertices.len());
        assert!((overview.colors[0].w - 0.5).abs() < 1e-6);
        assert_eq!(overview.colors[6], KEYPOINT_COLOR);
    }

    #[test]
    fn test_overview_skip_rounds_a_tenth() {
        let options = DisplayOptions::default();
        assert_eq!(overview_skip(15, &options), 2);
        assert_eq!(overview_skip(14, &options), 1);
        assert_eq!(overview_skip(25, &options), 2);
        assert_eq!(overview_skip(3, &options), 1);
        let fixed = DisplayOptions {
            frame_skip: Some(4),
            ..DisplayOptions::default()
        };
        assert_eq!(overview_skip(100, &fixed), 4);
    }

    #[test]
    fn test_vertex_values_on_flat_cloud() {
        // a coplanar cloud larger than one k-d tree bucket
        let points: Vec<Vec3> = (0..20)
            .flat_map(|y| (0..20).map(move |x| Vec3::new(x as f32 * 0.1, y as f32 * 0.1, 0.0)))
            .collect();
        let values: Vec<f32> = (0..points.len()).map(|i| i as f32).collect();
        let values = vertex_values(&triangle(), &points, &values);
        // vertices (0,0), (1,0) and (0,1) land on grid points 0, 10 and 200
        assert_eq!(values, vec![0.0, 10.0, 200.0]);
    }
}
