//! track4d: a benchmark harness for dense 4D surface tracking.
//!
//! A run loads a captured mesh sequence and its motion-capture landmarks,
//! fits a registration engine to the sequence, tracks query points through
//! it, and scores the result against the landmarks.
//!
//! # Quick Start
//!
//! ```no_run
//! use track4d::*;
//!
//! fn main() -> Result<()> {
//!     let config = BenchmarkConfig::from_file("benchmark.json")?;
//!     let mut sink = ArtifactSink::new(config.export_folder.clone());
//!     let report = run(config, &ApproachTable::with_defaults(), &FileSource, &mut sink)?;
//!     println!("{}", report.summary());
//!     Ok(())
//! }
//! ```
//!
//! # Approaches
//!
//! An approach couples an engine with a [`Strategy`]:
//!
//! - **marker-guided** engines see the landmarks; the landmarks measure
//!   control-point accuracy
//! - **marker-free** engines see geometry only; the landmarks measure
//!   non-control accuracy
//!
//! # Evaluations
//!
//! - control / non-control landmark error ([`DiffResult`])
//! - virtual landmarks from a synthetic set
//! - deformation intensity: path length of points sampled on the surface

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod engine;
pub mod evaluation;
pub mod io;
pub mod pipeline;
pub mod tracking;
pub mod visual;

// Re-export core types
pub use track4d_core::{
    BenchmarkConfig, ClipBound, CropOptions, DisplayOptions, EvaluationToggles, FrameWindow,
    IntensityOptions, InterpolationKind, Interpolator, Registry, Result, Structure, TimeAxis,
    Track4dError, Vec3,
};

// Re-export structures
pub use track4d_structures::{
    clip_with_contour, DiffResult, ErrorStats, LandmarkSet, Marker, MeshFrame, MeshSequence,
    PointIndex, Region, TraceLengthResult, VirtualKeypointSet,
};

pub use engine::{
    EngineSettings, FitParams, LandmarkRbfEngine, RegistrationEngine, TranslationIcpEngine,
};
pub use evaluation::{
    DeformationIntensity, EvaluationReport, MetricOutcome, VirtualLandmarkSummary,
    CONTROL_TRACK, INTENSITY_TRACK, NONCONTROL_TRACK, VIRTUAL_TRACK,
};
pub use io::{DataSource, FileSource, MemorySource};
pub use pipeline::{
    run, Approach, ApproachTable, EvaluatedRun, ImplementedRun, LoadedRun, RunReport, Strategy,
};
pub use tracking::TrackingAdapter;
pub use visual::{ArtifactSink, NullSink, VisualSink};

/// Initializes logging from `RUST_LOG`, defaulting to `level`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(level: log::LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}
