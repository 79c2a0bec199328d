//! Region-of-interest extraction driven by contour landmarks.
//!
//! For every mesh frame the contour markers' positions at the matching contour
//! frame define an axis-aligned box, grown by a margin. Geometry outside the
//! box is discarded. Frames are processed independently.

use glam::Vec3;
use track4d_core::{bounds_of, ClipBound, Result, Track4dError};

use crate::landmarks::LandmarkSet;
use crate::mesh_sequence::MeshSequence;

/// An axis-aligned clipping region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub min: Vec3,
    pub max: Vec3,
    pub bound: ClipBound,
}

impl Region {
    /// Bounds of `points` grown by `margin` on every side.
    pub fn around(points: &[Vec3], margin: f32, bound: ClipBound) -> Option<Self> {
        let (min, max) = bounds_of(points)?;
        Some(Self {
            min: min - Vec3::splat(margin),
            max: max + Vec3::splat(margin),
            bound,
        })
    }

    /// Returns true if `p` lies inside the region (boundary included).
    pub fn contains(&self, p: Vec3) -> bool {
        let inside_xy = p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y;
        match self.bound {
            ClipBound::Xy => inside_xy,
            ClipBound::Xyz => inside_xy && p.z >= self.min.z && p.z <= self.max.z,
        }
    }
}

/// Crops every frame of `meshes` to the region spanned by `contour`.
///
/// Mesh frame `i` is clipped with the contour's positions at contour frame
/// `start_index + i`. If the contour has no such frame the whole extraction
/// fails with [`Track4dError::UndefinedContour`]; the output always has the
/// same frame count, order and time axis as the input.
pub fn clip_with_contour(
    meshes: &MeshSequence,
    contour: &LandmarkSet,
    start_index: usize,
    bound: ClipBound,
    margin: f32,
) -> Result<MeshSequence> {
    let contour_frames = contour.frame_count().ok_or_else(|| {
        Track4dError::SchemaMismatch(format!(
            "contour '{}' has no frame axis, resample it first",
            contour.name()
        ))
    })?;
    if contour.is_empty() {
        return Err(Track4dError::UndefinedContour { frame: 0 });
    }

    let clipped = meshes.try_map_frames(|i, frame| {
        let contour_frame = start_index + i;
        if contour_frame >= contour_frames {
            return Err(Track4dError::UndefinedContour { frame: i });
        }
        let points: Vec<Vec3> = contour
            .frame_coords(contour_frame)?
            .into_iter()
            .map(|(_, p)| p)
            .collect();
        let region = Region::around(&points, margin, bound)
            .ok_or(Track4dError::UndefinedContour { frame: i })?;

        let cropped = frame.retain_vertices(|v| region.contains(v));
        log::debug!(
            "frame {i}: kept {}/{} vertices, {}/{} faces",
            cropped.num_vertices(),
            frame.num_vertices(),
            cropped.num_faces(),
            frame.num_faces()
        );
        Ok(cropped)
    })?;

    log::info!(
        "clipped {} frames: {} -> {} vertices",
        clipped.len(),
        meshes.total_vertices(),
        clipped.total_vertices()
    );
    Ok(clipped)
}
