//! Structure implementations for track4d.
//!
//! - [`MeshFrame`] / [`MeshSequence`] - captured surface geometry over time
//! - [`LandmarkSet`] / [`Marker`] - labelled trajectories, resampling, diffing, trace length
//! - [`VirtualKeypointSet`] - query points tracked through a registration model
//! - [`PointIndex`] - k-d tree nearest-neighbour queries over a point cloud
//! - [`roi`] - contour-driven region-of-interest extraction

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod keypoints;
pub mod landmarks;
pub mod mesh_frame;
pub mod mesh_sequence;
pub mod point_index;
pub mod roi;
pub mod stats;

pub use keypoints::VirtualKeypointSet;
pub use landmarks::{DiffResult, LandmarkSet, Marker, TraceLengthResult};
pub use mesh_frame::MeshFrame;
pub use mesh_sequence::MeshSequence;
pub use point_index::PointIndex;
pub use roi::{clip_with_contour, Region};
pub use stats::ErrorStats;
