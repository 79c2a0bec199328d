//! The four evaluations of a benchmark run.
//!
//! Evaluations run in a fixed order (control, non-control, virtual
//! landmarks, deformation intensity), each against the same fitted engine.
//! Each produces a [`MetricOutcome`]; a failing evaluation is recorded and
//! the remaining ones still run.

mod intensity;
mod landmarks;
mod virtual_landmarks;

use serde::{Deserialize, Serialize};
use track4d_core::{BenchmarkConfig, Result};
use track4d_structures::{DiffResult, LandmarkSet, MeshSequence};

use crate::io::DataSource;
use crate::pipeline::Strategy;
use crate::tracking::TrackingAdapter;
use crate::visual::VisualSink;

pub use intensity::{deformation_intensity, DeformationIntensity};
pub use landmarks::landmark_accuracy;
pub use virtual_landmarks::{virtual_landmarks, VirtualLandmarkSummary};

/// Track name of the control-landmark evaluation.
pub const CONTROL_TRACK: &str = "vkps_control";
/// Track name of the non-control-landmark evaluation.
pub const NONCONTROL_TRACK: &str = "vkps_noncontrol";
/// Track name of the virtual-landmark evaluation.
pub const VIRTUAL_TRACK: &str = "vkps_virtual";
/// Track name of the deformation-intensity evaluation.
pub const INTENSITY_TRACK: &str = "vkps_intensity";

/// Result of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum MetricOutcome<T> {
    /// The evaluation ran.
    Computed(T),
    /// The evaluation does not apply to the approach's strategy.
    NotApplicable,
    /// The evaluation was switched off in the configuration.
    Disabled,
    /// The evaluation ran and failed.
    Failed { error: String },
}

impl<T> MetricOutcome<T> {
    /// Records `result` under `metric`, logging failures.
    pub fn from_result(metric: &str, result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Computed(value),
            Err(e) => {
                log::warn!("{metric} evaluation failed: {e}");
                Self::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// The computed value, if any.
    pub fn computed(&self) -> Option<&T> {
        match self {
            Self::Computed(value) => Some(value),
            _ => None,
        }
    }

    /// Short status label.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Computed(_) => "computed",
            Self::NotApplicable => "n/a",
            Self::Disabled => "disabled",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Outcome of every evaluation of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub control: MetricOutcome<DiffResult>,
    pub noncontrol: MetricOutcome<DiffResult>,
    pub virtual_landmarks: MetricOutcome<VirtualLandmarkSummary>,
    pub deformation_intensity: MetricOutcome<DeformationIntensity>,
}

/// Inputs shared by all evaluations.
pub struct EvaluationContext<'a> {
    pub config: &'a BenchmarkConfig,
    pub strategy: Strategy,
    pub meshes: &'a MeshSequence,
    pub landmarks: &'a LandmarkSet,
    pub source: &'a dyn DataSource,
}

fn publish(what: &str, result: Result<()>) {
    if let Err(e) = result {
        log::warn!("could not publish {what}: {e}");
    }
}

fn accuracy(
    ctx: &EvaluationContext<'_>,
    adapter: &mut TrackingAdapter,
    sink: &mut dyn VisualSink,
    track_name: &str,
) -> MetricOutcome<DiffResult> {
    let result = landmark_accuracy(adapter, ctx.landmarks, track_name).map(|(tracked, diff)| {
        log::info!("{track_name}: {}", diff.stats.summary());
        if ctx.config.export {
            publish(
                track_name,
                sink.animate(track_name, &[&tracked, ctx.landmarks], &ctx.config.display),
            );
        }
        diff
    });
    MetricOutcome::from_result(track_name, result)
}

/// Landmark accuracy at the landmarks the engine was fitted with.
pub fn evaluate_control(
    ctx: &EvaluationContext<'_>,
    adapter: &mut TrackingAdapter,
    sink: &mut dyn VisualSink,
) -> MetricOutcome<DiffResult> {
    log::info!("evaluating control landmarks");
    if !ctx.config.evaluations.control {
        return MetricOutcome::Disabled;
    }
    if ctx.strategy != Strategy::MarkerGuided {
        log::info!("control landmarks: n/a for {:?} approaches", ctx.strategy);
        return MetricOutcome::NotApplicable;
    }
    accuracy(ctx, adapter, sink, CONTROL_TRACK)
}

/// Landmark accuracy of an engine that never saw the landmarks.
pub fn evaluate_noncontrol(
    ctx: &EvaluationContext<'_>,
    adapter: &mut TrackingAdapter,
    sink: &mut dyn VisualSink,
) -> MetricOutcome<DiffResult> {
    log::info!("evaluating non-control landmarks");
    if !ctx.config.evaluations.noncontrol {
        return MetricOutcome::Disabled;
    }
    if ctx.strategy != Strategy::MarkerFree {
        log::info!("non-control landmarks: n/a for {:?} approaches", ctx.strategy);
        return MetricOutcome::NotApplicable;
    }
    accuracy(ctx, adapter, sink, NONCONTROL_TRACK)
}

/// Tracks the synthetic landmark set named by the configuration.
pub fn evaluate_virtual(
    ctx: &EvaluationContext<'_>,
    adapter: &mut TrackingAdapter,
    sink: &mut dyn VisualSink,
) -> MetricOutcome<VirtualLandmarkSummary> {
    log::info!("evaluating virtual landmarks");
    if !ctx.config.evaluations.virtual_landmarks {
        return MetricOutcome::Disabled;
    }
    let result = ctx
        .source
        .load_landmarks(&ctx.config.test_landmark_path)
        .and_then(|source| {
            virtual_landmarks(adapter, &source, ctx.config.interpolation.kernel())
        })
        .map(|(tracked, summary)| {
            if ctx.config.export {
                publish(
                    VIRTUAL_TRACK,
                    sink.animate(VIRTUAL_TRACK, &[&tracked], &ctx.config.display),
                );
            }
            if ctx.config.plot {
                publish(
                    VIRTUAL_TRACK,
                    sink.overview(VIRTUAL_TRACK, ctx.meshes, &[&tracked], &ctx.config.display),
                );
            }
            summary
        });
    MetricOutcome::from_result(VIRTUAL_TRACK, result)
}

/// Path length of points sampled on the reference surface.
pub fn evaluate_intensity(
    ctx: &EvaluationContext<'_>,
    adapter: &mut TrackingAdapter,
    sink: &mut dyn VisualSink,
) -> MetricOutcome<DeformationIntensity> {
    log::info!("evaluating deformation intensity");
    if !ctx.config.evaluations.deformation_intensity {
        return MetricOutcome::Disabled;
    }
    let result = deformation_intensity(adapter, ctx.meshes, &ctx.config.intensity).map(|intensity| {
        log::info!("{INTENSITY_TRACK}: {}", intensity.trace.stats.summary());
        if ctx.config.plot {
            if let Ok(mesh) = ctx.meshes.frame(intensity.reference_frame) {
                publish(
                    INTENSITY_TRACK,
                    sink.heat_map(
                        INTENSITY_TRACK,
                        mesh,
                        &intensity.trace.starts,
                        &intensity.trace.lengths,
                        &ctx.config.display,
                    ),
                );
            }
        }
        intensity
    });
    MetricOutcome::from_result(INTENSITY_TRACK, result)
}

/// Runs every evaluation in order.
pub fn evaluate_all(
    ctx: &EvaluationContext<'_>,
    adapter: &mut TrackingAdapter,
    sink: &mut dyn VisualSink,
) -> EvaluationReport {
    EvaluationReport {
        control: evaluate_control(ctx, adapter, sink),
        noncontrol: evaluate_noncontrol(ctx, adapter, sink),
        virtual_landmarks: evaluate_virtual(ctx, adapter, sink),
        deformation_intensity: evaluate_intensity(ctx, adapter, sink),
    }
}
