//! The benchmark run, stage by stage.
//!
//! ```text
//! LoadedRun ──implement──▶ ImplementedRun ──evaluate──▶ EvaluatedRun ──export──▶ RunReport
//! ```
//!
//! Each stage consumes the previous one, so a stage can only run once and
//! only after its predecessor succeeded. Loading and implementing fail the
//! whole run; evaluation failures are recorded per metric.

mod approach;
mod report;

use std::time::Instant;

use chrono::Local;
use track4d_core::{BenchmarkConfig, Result, Track4dError};
use track4d_structures::{clip_with_contour, LandmarkSet, MeshSequence};

pub use approach::{Approach, ApproachTable, EngineFactory, Strategy};
pub use report::{RunReport, REPORT_FILE};

use crate::evaluation::{evaluate_all, EvaluationContext, EvaluationReport};
use crate::io::DataSource;
use crate::tracking::TrackingAdapter;
use crate::visual::VisualSink;

/// Name the prepared landmark set is loaded into the engine under.
pub const LANDMARK_SET_NAME: &str = "landmarks";

fn banner(stage: &str) {
    log::info!("{}", "-".repeat(50));
    log::info!("{stage}");
}

/// A run with its data loaded, resampled and cropped.
pub struct LoadedRun {
    config: BenchmarkConfig,
    approach: Approach,
    meshes: MeshSequence,
    landmarks: LandmarkSet,
    started: Instant,
    started_at: String,
}

impl LoadedRun {
    /// Loads the run's data from `source` and prepares it.
    pub fn load(config: BenchmarkConfig, approach: Approach, source: &dyn DataSource) -> Result<Self> {
        banner("loading data");
        config.validate()?;
        let meshes = source.load_mesh_sequence(&config.mesh_path, config.window, config.origin_fps)?;
        let fps = meshes.axis().fps;
        if (fps - config.fps()).abs() > 1e-9 {
            return Err(Track4dError::SchemaMismatch(format!(
                "mesh sequence runs at {fps} fps, the window implies {}",
                config.fps()
            )));
        }
        let landmarks = source.load_landmarks(&config.landmark_path)?;
        Self::prepare(config, approach, meshes, landmarks)
    }

    /// Prepares already loaded data.
    ///
    /// The landmarks are resliced onto the mesh frame rate, aligned with the
    /// first mesh frame; the meshes are cropped to the contour markers; the
    /// landmarks are then cut to exactly the mesh frames.
    pub fn prepare(
        config: BenchmarkConfig,
        approach: Approach,
        meshes: MeshSequence,
        raw_landmarks: LandmarkSet,
    ) -> Result<Self> {
        let started = Instant::now();
        let started_at = Local::now().to_rfc3339();
        config.validate()?;

        let mesh_axis = meshes.axis();
        let kernel = config.interpolation.kernel();
        let resliced = raw_landmarks.reslice(mesh_axis.fps, mesh_axis.start_time, kernel)?;
        let landmark_axis = resliced.axis().ok_or_else(|| {
            Track4dError::SchemaMismatch("resliced landmarks carry no axis".to_string())
        })?;
        let offset = landmark_axis.offset_of(mesh_axis.start_time);
        let start_index =
            usize::try_from(offset).map_err(|_| Track4dError::UndefinedContour { frame: 0 })?;
        log::debug!(
            "landmarks resliced to {} frames at {} fps, mesh frame 0 is landmark frame {start_index}",
            landmark_axis.len,
            landmark_axis.fps
        );

        let contour = resliced.extract(&config.crop.contour)?;
        let meshes = clip_with_contour(
            &meshes,
            &contour,
            start_index,
            config.crop.clip_bound,
            config.crop.margin,
        )?;
        let landmarks = resliced
            .window(start_index, meshes.len())?
            .renamed(LANDMARK_SET_NAME);

        log::info!(
            "prepared {} frames with {} landmarks",
            meshes.len(),
            landmarks.len()
        );
        Ok(Self {
            config,
            approach,
            meshes,
            landmarks,
            started,
            started_at,
        })
    }

    /// The cropped mesh sequence.
    pub fn meshes(&self) -> &MeshSequence {
        &self.meshes
    }

    /// The landmarks on the mesh time axis.
    pub fn landmarks(&self) -> &LandmarkSet {
        &self.landmarks
    }

    /// Builds the approach's engine and fits it to the data.
    pub fn implement(self) -> Result<ImplementedRun> {
        banner(&format!("implementing {}", self.approach.name));
        let axis = self.meshes.axis();
        let fit_started = Instant::now();

        let mut engine = self.approach.build_engine(axis.fps);
        engine.add_frames(&self.meshes)?;
        if self.approach.strategy.uses_landmarks() {
            engine.load_landmarks(LANDMARK_SET_NAME, &self.landmarks)?;
        }
        engine.fit(&self.config.fit_params)?;

        let registration_seconds = fit_started.elapsed().as_secs_f64();
        let adapter = TrackingAdapter::new(engine, axis)?;
        log::info!(
            "{} registration took {registration_seconds:.2}s",
            adapter.engine_name()
        );
        Ok(ImplementedRun {
            adapter,
            registration_seconds,
            loaded: self,
        })
    }
}

/// A run with a fitted engine.
pub struct ImplementedRun {
    loaded: LoadedRun,
    adapter: TrackingAdapter,
    registration_seconds: f64,
}

impl ImplementedRun {
    /// The tracking adapter over the fitted engine.
    pub fn adapter_mut(&mut self) -> &mut TrackingAdapter {
        &mut self.adapter
    }

    /// Runs every enabled evaluation.
    ///
    /// `source` provides the synthetic landmarks; `sink` receives the visual
    /// output. Failures are recorded in the report, never propagated.
    pub fn evaluate(mut self, source: &dyn DataSource, sink: &mut dyn VisualSink) -> EvaluatedRun {
        banner("evaluating");
        let loaded = &self.loaded;
        let ctx = EvaluationContext {
            config: &loaded.config,
            strategy: loaded.approach.strategy,
            meshes: &loaded.meshes,
            landmarks: &loaded.landmarks,
            source,
        };
        let metrics = evaluate_all(&ctx, &mut self.adapter, sink);
        EvaluatedRun { run: self, metrics }
    }
}

/// A run whose evaluations are complete.
pub struct EvaluatedRun {
    run: ImplementedRun,
    metrics: EvaluationReport,
}

impl EvaluatedRun {
    /// The evaluation outcomes.
    pub fn metrics(&self) -> &EvaluationReport {
        &self.metrics
    }

    /// Drops the bulky run data and produces the report, writing it to the
    /// export folder when export is enabled.
    pub fn export(self) -> Result<RunReport> {
        banner("exporting");
        let ImplementedRun {
            loaded,
            adapter,
            registration_seconds,
        } = self.run;
        let axis = loaded.meshes.axis();

        let report = RunReport {
            approach: loaded.approach.name.clone(),
            strategy: loaded.approach.strategy,
            started_at: loaded.started_at,
            frames: axis.len,
            fps: axis.fps,
            start_time: axis.start_time,
            landmark_count: loaded.landmarks.len(),
            cropped_vertices: loaded.meshes.total_vertices(),
            registration_seconds,
            total_seconds: loaded.started.elapsed().as_secs_f64(),
            tracked: adapter.tracked_names(),
            metrics: self.metrics,
            config: loaded.config,
        };

        if report.config.export {
            report.write(&report.config.export_folder)?;
        }
        Ok(report)
    }
}

/// Runs a complete benchmark.
///
/// The approach is resolved before any data is touched, so an unknown
/// approach fails without loading or writing anything.
pub fn run(
    config: BenchmarkConfig,
    table: &ApproachTable,
    source: &dyn DataSource,
    sink: &mut dyn VisualSink,
) -> Result<RunReport> {
    let approach = table.resolve(&config.approach)?.clone();
    log::info!(
        "benchmarking '{}' ({:?}) on {}",
        approach.name,
        approach.strategy,
        config.mesh_path.display()
    );
    LoadedRun::load(config, approach, source)?
        .implement()?
        .evaluate(source, sink)
        .export()
}
