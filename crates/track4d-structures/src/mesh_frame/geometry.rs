//! Geometry computation methods for mesh frames.
//!
//! This module contains methods deriving data from raw vertices and triangles:
//! - Face areas
//! - Area-weighted surface sampling
//! - Sub-mesh extraction by vertex predicate

use glam::Vec3;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use super::MeshFrame;

impl MeshFrame {
    /// Computes face areas (half the cross product of the first two edges).
    pub(super) fn compute_face_data(&mut self) {
        self.face_areas.clear();
        self.face_areas.reserve(self.triangles.len());

        for tri in &self.triangles {
            let v0 = self.vertices[tri[0] as usize];
            let v1 = self.vertices[tri[1] as usize];
            let v2 = self.vertices[tri[2] as usize];
            self.face_areas.push((v1 - v0).cross(v2 - v0).length() * 0.5);
        }
    }

    /// Samples `count` points uniformly over the surface.
    ///
    /// Triangles are chosen with probability proportional to their area and a
    /// point is drawn uniformly inside the chosen triangle. A frame without any
    /// area falls back to sampling vertices; an empty frame yields no points.
    pub fn sample_points<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Vec3> {
        if self.vertices.is_empty() {
            return Vec::new();
        }

        let Ok(faces) = WeightedIndex::new(&self.face_areas) else {
            log::debug!(
                "mesh '{}' has no surface area, sampling vertices",
                self.name
            );
            return (0..count)
                .map(|_| self.vertices[rng.gen_range(0..self.vertices.len())])
                .collect();
        };

        (0..count)
            .map(|_| {
                let tri = self.triangles[faces.sample(rng)];
                let (v0, v1, v2) = (
                    self.vertices[tri[0] as usize],
                    self.vertices[tri[1] as usize],
                    self.vertices[tri[2] as usize],
                );
                // Square-root warp keeps the barycentric draw uniform
                let r1 = rng.gen::<f32>().sqrt();
                let r2 = rng.gen::<f32>();
                v0 * (1.0 - r1) + v1 * (r1 * (1.0 - r2)) + v2 * (r1 * r2)
            })
            .collect()
    }

    /// Returns the sub-mesh made of vertices satisfying `keep`.
    ///
    /// Triangles referencing any dropped vertex are dropped as well; remaining
    /// indices are compacted. Colours follow their vertices.
    #[allow(clippy::cast_possible_truncation)]
    pub fn retain_vertices(&self, mut keep: impl FnMut(Vec3) -> bool) -> MeshFrame {
        let mut remap = vec![u32::MAX; self.vertices.len()];
        let mut vertices = Vec::new();
        let mut colors = self.colors.as_ref().map(|_| Vec::new());

        for (i, &v) in self.vertices.iter().enumerate() {
            if keep(v) {
                remap[i] = vertices.len() as u32;
                vertices.push(v);
                if let (Some(out), Some(src)) = (colors.as_mut(), self.colors.as_ref()) {
                    out.push(src[i]);
                }
            }
        }

        let triangles: Vec<[u32; 3]> = self
            .triangles
            .iter()
            .filter_map(|tri| {
                let mapped = tri.map(|vi| remap[vi as usize]);
                mapped.iter().all(|&vi| vi != u32::MAX).then_some(mapped)
            })
            .collect();

        let mut frame = MeshFrame {
            name: self.name.clone(),
            vertices,
            triangles,
            colors,
            face_areas: Vec::new(),
        };
        frame.compute_face_data();
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::grid;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use track4d_core::Structure;

    use super::*;

    #[test]
    fn test_face_areas() {
        let mesh = grid("g", 2);
        assert_eq!(mesh.face_areas().len(), 8);
        assert!(mesh.face_areas().iter().all(|a| (a - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_samples_lie_on_surface() {
        let mesh = grid("g", 4);
        let mut rng = StdRng::seed_from_u64(7);
        let samples = mesh.sample_points(200, &mut rng);
        assert_eq!(samples.len(), 200);
        for p in samples {
            assert!(p.z.abs() < 1e-6);
            assert!((0.0..=4.0).contains(&p.x));
            assert!((0.0..=4.0).contains(&p.y));
        }
    }

    #[test]
    fn test_sampling_is_seeded() {
        let mesh = grid("g", 4);
        let a = mesh.sample_points(10, &mut StdRng::seed_from_u64(3));
        let b = mesh.sample_points(10, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_degenerate_mesh_samples_vertices() {
        let mesh = MeshFrame::new("pts", vec![Vec3::X, Vec3::Y], Vec::new()).unwrap();
        let samples = mesh.sample_points(5, &mut StdRng::seed_from_u64(1));
        assert!(samples.iter().all(|p| *p == Vec3::X || *p == Vec3::Y));
    }

    #[test]
    fn test_retain_vertices_compacts() {
        let mesh = grid("g", 2);
        let cropped = mesh.retain_vertices(|v| v.x <= 1.0);
        assert_eq!(cropped.num_vertices(), 6);
        // only the left column of quads survives
        assert_eq!(cropped.num_faces(), 4);
        assert!(cropped
            .triangles()
            .iter()
            .flatten()
            .all(|&vi| (vi as usize) < cropped.num_vertices()));
        assert_eq!(cropped.name(), "g");
    }

    #[test]
    fn test_retain_keeps_colors_aligned() {
        let mesh = grid("g", 1)
            .with_colors(vec![Vec3::X, Vec3::Y, Vec3::Z, Vec3::ONE])
            .unwrap();
        let cropped = mesh.retain_vertices(|v| v.y > 0.5);
        assert_eq!(cropped.colors().unwrap(), &[Vec3::Z, Vec3::ONE]);
    }
}
