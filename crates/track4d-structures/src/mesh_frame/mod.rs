//! Surface geometry of a single captured frame.

mod geometry;

use glam::Vec3;
use track4d_core::{bounds_of, Result, Structure, Track4dError};

/// A triangle mesh captured at one instant.
///
/// Derived data (face areas) is computed once on construction; the
/// frame is immutable afterwards.
#[derive(Debug, Clone)]
pub struct MeshFrame {
    // Core data
    name: String,
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    colors: Option<Vec<Vec3>>,

    // Computed data
    face_areas: Vec<f32>,
}

impl MeshFrame {
    /// Creates a mesh frame from vertices and triangles.
    ///
    /// Fails with [`Track4dError::DataLoad`] if a triangle references a missing vertex.
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<Vec3>,
        triangles: Vec<[u32; 3]>,
    ) -> Result<Self> {
        let name = name.into();
        let n = vertices.len();
        if let Some(bad) = triangles
            .iter()
            .flatten()
            .find(|&&vi| vi as usize >= n)
        {
            return Err(Track4dError::DataLoad(format!(
                "mesh '{name}': face references vertex {bad}, mesh has {n} vertices"
            )));
        }

        let mut frame = Self {
            name,
            vertices,
            triangles,
            colors: None,
            face_areas: Vec::new(),
        };
        frame.compute_face_data();
        Ok(frame)
    }

    /// Creates a mesh frame from polygon faces using fan triangulation.
    ///
    /// For a polygon with vertices [v0, v1, v2, v3, ...], creates triangles:
    /// [v0, v1, v2], [v0, v2, v3], ... Faces with fewer than 3 vertices are dropped.
    pub fn from_polygons(
        name: impl Into<String>,
        vertices: Vec<Vec3>,
        faces: &[Vec<u32>],
    ) -> Result<Self> {
        let mut triangles = Vec::with_capacity(faces.len());
        for face in faces.iter().filter(|f| f.len() >= 3) {
            let v0 = face[0];
            for i in 1..(face.len() - 1) {
                triangles.push([v0, face[i], face[i + 1]]);
            }
        }
        Self::new(name, vertices, triangles)
    }

    /// Attaches per-vertex colours.
    pub fn with_colors(mut self, colors: Vec<Vec3>) -> Result<Self> {
        if colors.len() != self.vertices.len() {
            return Err(Track4dError::DataLoad(format!(
                "mesh '{}': {} colours for {} vertices",
                self.name,
                colors.len(),
                self.vertices.len()
            )));
        }
        self.colors = Some(colors);
        Ok(self)
    }

    /// Returns the number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of triangles.
    pub fn num_faces(&self) -> usize {
        self.triangles.len()
    }

    /// Returns the vertices.
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Returns the triangles.
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Returns the per-vertex colours, if any.
    pub fn colors(&self) -> Option<&[Vec3]> {
        self.colors.as_deref()
    }

    /// Returns the face areas.
    pub fn face_areas(&self) -> &[f32] {
        &self.face_areas
    }

    /// Returns the total surface area.
    pub fn surface_area(&self) -> f32 {
        self.face_areas.iter().sum()
    }

    /// Returns true if the frame has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

impl Structure for MeshFrame {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        "MeshFrame"
    }

    fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        bounds_of(&self.vertices)
    }
}
