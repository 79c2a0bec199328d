//! Wavefront OBJ meshes.

use std::path::Path;

use glam::Vec3;
use track4d_core::{Result, Track4dError};
use track4d_structures::MeshFrame;

/// Loads an OBJ file as one triangulated frame, merging all of its models.
///
/// Vertex colours are kept when every model carries them.
#[allow(clippy::cast_possible_truncation)]
pub fn read_obj(path: &Path) -> Result<MeshFrame> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| Track4dError::DataLoad(format!("{}: {e}", path.display())))?;

    let mut vertices = Vec::new();
    let mut colors = Vec::new();
    let mut triangles = Vec::new();
    let mut has_colors = !models.is_empty();

    for model in models {
        let mesh = model.mesh;
        let vertex_offset = vertices.len() as u32;

        vertices.extend(
            mesh.positions
                .chunks_exact(3)
                .map(|p| Vec3::new(p[0], p[1], p[2])),
        );
        if mesh.vertex_color.len() == mesh.positions.len() {
            colors.extend(
                mesh.vertex_color
                    .chunks_exact(3)
                    .map(|c| Vec3::new(c[0], c[1], c[2])),
            );
        } else {
            has_colors = false;
        }
        triangles.extend(mesh.indices.chunks_exact(3).map(|f| {
            [
                f[0] + vertex_offset,
                f[1] + vertex_offset,
                f[2] + vertex_offset,
            ]
        }));
    }

    let name = path
        .file_stem()
        .map_or_else(|| "mesh".to_string(), |s| s.to_string_lossy().into_owned());
    let frame = MeshFrame::new(name, vertices, triangles)?;
    if has_colors {
        frame.with_colors(colors)
    } else {
        Ok(frame)
    }
}
