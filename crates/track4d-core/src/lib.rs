//! Core abstractions for track4d.
//!
//! This crate provides the fundamental types shared by the benchmark crates:
//! - [`Track4dError`] taxonomy and the [`Result`] alias
//! - [`BenchmarkConfig`] and its nested option groups
//! - [`TimeAxis`], the regular clock shared by meshes and resampled landmarks
//! - [`Interpolator`] kernels for resampling trajectories
//! - [`Structure`] trait and the run-owned [`Registry`]

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Options structs legitimately have many boolean flags
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod interpolation;
pub mod options;
pub mod registry;
pub mod structure;
pub mod time;

pub use error::{Result, Track4dError};
pub use interpolation::{CatmullRom, InterpolationKind, Interpolator, Linear};
pub use options::{
    BenchmarkConfig, ClipBound, CropOptions, DisplayOptions, EvaluationToggles, FrameWindow,
    IntensityOptions,
};
pub use registry::Registry;
pub use structure::{bounds_of, Structure};
pub use time::{TimeAxis, TIME_EPSILON};

// Re-export glam types for convenience
pub use glam::Vec3;
