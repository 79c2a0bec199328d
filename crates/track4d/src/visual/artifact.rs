//! Sink writing artifacts to a folder.

use std::fs;
use std::path::PathBuf;

use glam::{Vec3, Vec4};
use track4d_core::{DisplayOptions, Result};
use track4d_structures::{LandmarkSet, MeshFrame, MeshSequence};

use super::color_maps::ColorMapRegistry;
use super::{stacked_overview, vertex_values, VisualSink};
use crate::io::{write_landmark_sets, write_ply};

/// Writes every artifact into one folder.
///
/// - `animate` writes `<name>.json`, the trajectories in landmark-file layout
/// - `overview` writes `<name>_overview.ply`
/// - `heat_map` writes `<name>_heatmap.ply` with per-vertex colours
pub struct ArtifactSink {
    folder: PathBuf,
    color_maps: ColorMapRegistry,
    written: Vec<PathBuf>,
}

impl ArtifactSink {
    /// Creates a sink writing into `folder`. The folder is created on first write.
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            color_maps: ColorMapRegistry::new(),
            written: Vec::new(),
        }
    }

    /// Every file written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn target(&mut self, file_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.folder)?;
        let path = self.folder.join(file_name);
        log::info!("writing {}", path.display());
        self.written.push(path.clone());
        Ok(path)
    }
}

impl VisualSink for ArtifactSink {
    fn animate(&mut self, name: &str, sets: &[&LandmarkSet], _options: &DisplayOptions) -> Result<()> {
        let path = self.target(&format!("{name}.json"))?;
        write_landmark_sets(&path, sets)
    }

    fn overview(
        &mut self,
        name: &str,
        meshes: &MeshSequence,
        sets: &[&LandmarkSet],
        options: &DisplayOptions,
    ) -> Result<()> {
        let overview = stacked_overview(meshes, sets, options);
        let path = self.target(&format!("{name}_overview.ply"))?;
        let [width, height] = options.window_size;
        write_ply(
            &path,
            &overview.vertices,
            Some(overview.colors.as_slice()),
            &overview.triangles,
            &[format!("window_size {width} {height}")],
        )
    }

    fn heat_map(
        &mut self,
        name: &str,
        mesh: &MeshFrame,
        points: &[Vec3],
        values: &[f32],
        options: &DisplayOptions,
    ) -> Result<()> {
        let per_vertex = vertex_values(mesh, points, values);
        let alpha = options.opacity.clamp(0.0, 1.0);
        let colors: Vec<Vec4> = match self.color_maps.get_or_default(&options.color_map) {
            Some(map) => map.map(&per_vertex, options.color_bounds),
            None => vec![Vec3::ONE; per_vertex.len()],
        }
        .into_iter()
        .map(|c| c.extend(alpha))
        .collect();
        let path = self.target(&format!("{name}_heatmap.ply"))?;
        write_ply(
            &path,
            mesh.vertices(),
            Some(colors.as_slice()),
            mesh.triangles(),
            &[],
        )
    }
}
