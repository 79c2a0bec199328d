//! Structure trait and related types.
//!
//! A [`Structure`] is a named geometric object handled by the benchmark, such as a
//! mesh frame, a landmark set or a tracked keypoint set.

use glam::Vec3;

/// A named geometric object.
pub trait Structure {
    /// Returns the name of this structure.
    fn name(&self) -> &str;

    /// Returns the type name of this structure (e.g., "`MeshFrame`", "`LandmarkSet`").
    fn type_name(&self) -> &'static str;

    /// Returns the axis-aligned bounding box over all positions.
    ///
    /// Returns `None` if the structure has no spatial extent.
    fn bounding_box(&self) -> Option<(Vec3, Vec3)>;
}

/// Computes the axis-aligned bounding box of a set of points.
pub fn bounds_of<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Option<(Vec3, Vec3)> {
    let mut iter = points.into_iter();
    let first = *iter.next()?;
    Some(iter.fold((first, first), |(min, max), p| (min.min(*p), max.max(*p))))
}
