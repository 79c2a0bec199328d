//! Nearest-neighbour queries over a fixed point cloud.
//!
//! Built once per cloud (a frame's vertices, sampled surface points) and
//! queried many times by registration and visualisation.

use std::num::NonZeroUsize;

use glam::Vec3;
use kiddo::{ImmutableKdTree, SquaredEuclidean};

/// A k-d tree over a fixed set of points, answering with point indices.
pub struct PointIndex {
    tree: Option<ImmutableKdTree<f32, 3>>,
    len: usize,
}

impl PointIndex {
    /// Builds the index over `points`; an empty cloud yields an index that
    /// never finds anything.
    pub fn new(points: &[Vec3]) -> Self {
        let entries: Vec<[f32; 3]> = points.iter().map(|p| p.to_array()).collect();
        let tree = (!entries.is_empty()).then(|| ImmutableKdTree::new_from_slice(&entries));
        Self {
            tree,
            len: points.len(),
        }
    }

    /// Returns the number of indexed points.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no points are indexed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the index of the point closest to `query` and its distance.
    #[allow(clippy::cast_possible_truncation)]
    pub fn nearest(&self, query: Vec3) -> Option<(usize, f32)> {
        let found = self
            .tree
            .as_ref()?
            .nearest_one::<SquaredEuclidean>(&query.to_array());
        Some((found.item as usize, found.distance.sqrt()))
    }

    /// Returns the indices of the `k` points closest to `query`, nearest first.
    ///
    /// Fewer are returned when the cloud holds fewer than `k` points.
    #[allow(clippy::cast_possible_truncation)]
    pub fn nearest_n(&self, query: Vec3, k: usize) -> Vec<usize> {
        let (Some(tree), Some(k)) = (self.tree.as_ref(), NonZeroUsize::new(k.min(self.len))) else {
            return Vec::new();
        };
        tree.nearest_n::<SquaredEuclidean>(&query.to_array(), k)
            .into_iter()
            .map(|found| found.item as usize)
            .collect()
    }
}
