//! The exported record of a run.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use track4d_core::{BenchmarkConfig, Result};

use super::Strategy;
use crate::evaluation::{EvaluationReport, MetricOutcome};

/// File name of the report inside the export folder.
pub const REPORT_FILE: &str = "benchmark.json";

/// Configuration, timing and metric outcomes of a finished run.
///
/// Holds no mesh or landmark data, so its size does not depend on the
/// resolution of the captured sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub approach: String,
    pub strategy: Strategy,
    /// Wall-clock start of the run, RFC 3339.
    pub started_at: String,
    pub frames: usize,
    pub fps: f64,
    pub start_time: f64,
    pub landmark_count: usize,
    /// Total vertex count of the cropped sequence.
    pub cropped_vertices: usize,
    pub registration_seconds: f64,
    pub total_seconds: f64,
    /// Names of every tracked point set.
    pub tracked: Vec<String>,
    pub metrics: EvaluationReport,
    pub config: BenchmarkConfig,
}

fn outcome_line<T>(out: &mut String, label: &str, outcome: &MetricOutcome<T>, detail: impl Fn(&T) -> String) {
    let text = match outcome {
        MetricOutcome::Computed(value) => detail(value),
        MetricOutcome::Failed { error } => format!("failed: {error}"),
        other => other.status().to_string(),
    };
    let _ = writeln!(out, "  {label:<24} {text}");
}

impl RunReport {
    /// Human-readable summary, one line per metric.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} ({:?}): {} frames at {} fps, registration {:.2}s, total {:.2}s",
            self.approach,
            self.strategy,
            self.frames,
            self.fps,
            self.registration_seconds,
            self.total_seconds
        );
        outcome_line(&mut out, "control landmarks", &self.metrics.control, |d| {
            d.stats.summary()
        });
        outcome_line(&mut out, "non-control landmarks", &self.metrics.noncontrol, |d| {
            d.stats.summary()
        });
        outcome_line(&mut out, "virtual landmarks", &self.metrics.virtual_landmarks, |v| {
            match &v.ground_truth {
                Some(diff) => diff.stats.summary(),
                None => format!("{} points tracked (no ground truth)", v.points),
            }
        });
        outcome_line(
            &mut out,
            "deformation intensity",
            &self.metrics.deformation_intensity,
            |i| i.trace.stats.summary(),
        );
        out
    }

    /// Writes the report as `benchmark.json` into `folder`, creating it if needed.
    pub fn write(&self, folder: &Path) -> Result<PathBuf> {
        fs::create_dir_all(folder)?;
        let path = folder.join(REPORT_FILE);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        log::info!("report written to {}", path.display());
        Ok(path)
    }

    /// Reads a report written by [`RunReport::write`].
    pub fn read(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
