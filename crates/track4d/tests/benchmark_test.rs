//! End-to-end benchmark runs on synthetic in-memory data.

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use track4d::*;

const LANDMARK_PATH: &str = "landmarks.json";
const VIRTUAL_PATH: &str = "virtual.json";
const CORNERS: [Vec3; 4] = [
    Vec3::new(20.0, 20.0, 0.0),
    Vec3::new(80.0, 20.0, 0.0),
    Vec3::new(80.0, 80.0, 0.0),
    Vec3::new(20.0, 80.0, 0.0),
];

/// A flat square of `n x n` vertices spanning 0..100 in x and y.
fn flat_grid(n: u32) -> MeshFrame {
    let step = 100.0 / (n - 1) as f32;
    let vertices = (0..n)
        .flat_map(|y| (0..n).map(move |x| Vec3::new(x as f32 * step, y as f32 * step, 0.0)))
        .collect();
    let mut triangles = Vec::new();
    for y in 0..n - 1 {
        for x in 0..n - 1 {
            let i = y * n + x;
            triangles.push([i, i + 1, i + n + 1]);
            triangles.push([i, i + n + 1, i + n]);
        }
    }
    MeshFrame::new("grid", vertices, triangles).unwrap()
}

/// Four markers resting on the grid, sampled at 10 fps for `frames` frames.
fn static_markers(frames: usize) -> LandmarkSet {
    let markers = CORNERS
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let samples = (0..frames).map(|k| (k as f64 / 10.0, p)).collect();
            Marker::new(format!("marker {i}"), samples).unwrap()
        })
        .collect();
    LandmarkSet::new("landmarks", markers).unwrap()
}

fn random_points() -> LandmarkSet {
    let markers = [Vec3::new(50.0, 50.0, 0.0), Vec3::new(30.0, 60.0, 0.0)]
        .iter()
        .enumerate()
        .map(|(i, &p)| Marker::new(format!("random {i}"), vec![(0.0, p)]).unwrap())
        .collect();
    LandmarkSet::new("random", markers).unwrap()
}

fn source(frames: usize, grid: u32) -> MemorySource {
    MemorySource::new(vec![flat_grid(grid); frames])
        .with_landmarks(LANDMARK_PATH, static_markers(frames))
        .with_landmarks(VIRTUAL_PATH, random_points())
}

fn config(approach: &str) -> BenchmarkConfig {
    let mut config = BenchmarkConfig {
        approach: approach.to_string(),
        plot: false,
        export: false,
        landmark_path: PathBuf::from(LANDMARK_PATH),
        test_landmark_path: PathBuf::from(VIRTUAL_PATH),
        window: FrameWindow {
            start: 0,
            end: 10,
            stride: 1,
        },
        origin_fps: 10.0,
        ..BenchmarkConfig::default()
    };
    config.crop.contour = (0..4).map(|i| format!("marker {i}")).collect();
    config.intensity.sample_count = 20;
    config
}

fn scratch(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("track4d-it-{tag}-{}", std::process::id()))
}

#[test]
fn test_marker_guided_static_scene() {
    let report = run(
        config("rbf"),
        &ApproachTable::with_defaults(),
        &source(10, 11),
        &mut NullSink,
    )
    .unwrap();

    assert_eq!(report.strategy, Strategy::MarkerGuided);
    assert_eq!(report.frames, 10);
    assert_eq!(report.landmark_count, 4);

    let control = report.metrics.control.computed().unwrap();
    assert_eq!(control.frames, 10);
    assert_eq!(control.errors.len(), 4);
    assert!(control.max_error() < 1e-6);
    assert_eq!(report.metrics.noncontrol, MetricOutcome::NotApplicable);

    let virtual_summary = report.metrics.virtual_landmarks.computed().unwrap();
    assert_eq!(virtual_summary.points, 2);
    assert!(virtual_summary.ground_truth.is_none());

    let intensity = report.metrics.deformation_intensity.computed().unwrap();
    assert_eq!(intensity.reference_frame, 1);
    assert!(intensity.trace.lengths.iter().all(|l| *l < 1e-6));

    assert_eq!(
        report.tracked,
        vec![CONTROL_TRACK, INTENSITY_TRACK, VIRTUAL_TRACK]
    );
}

#[test]
fn test_marker_free_swaps_control_metrics() {
    let report = run(
        config("icp"),
        &ApproachTable::with_defaults(),
        &source(10, 11),
        &mut NullSink,
    )
    .unwrap();

    assert_eq!(report.strategy, Strategy::MarkerFree);
    assert_eq!(report.metrics.control, MetricOutcome::NotApplicable);
    let noncontrol = report.metrics.noncontrol.computed().unwrap();
    assert!(noncontrol.max_error() < 1e-6);
    assert!(report.tracked.iter().any(|t| t == NONCONTROL_TRACK));
}

/// Data source that records whether it was touched.
#[derive(Default)]
struct UntouchedSource {
    touched: Cell<bool>,
}

impl DataSource for UntouchedSource {
    fn load_mesh_sequence(&self, _: &Path, _: FrameWindow, _: f64) -> Result<MeshSequence> {
        self.touched.set(true);
        Err(Track4dError::DataLoad("unexpected load".into()))
    }

    fn load_landmarks(&self, _: &Path) -> Result<LandmarkSet> {
        self.touched.set(true);
        Err(Track4dError::DataLoad("unexpected load".into()))
    }
}

/// Source whose meshes ignore the requested stride.
struct NativeRateSource(MemorySource);

impl DataSource for NativeRateSource {
    fn load_mesh_sequence(&self, path: &Path, window: FrameWindow, origin_fps: f64) -> Result<MeshSequence> {
        let native = FrameWindow { stride: 1, ..window };
        self.0.load_mesh_sequence(path, native, origin_fps)
    }

    fn load_landmarks(&self, path: &Path) -> Result<LandmarkSet> {
        self.0.load_landmarks(path)
    }
}

#[test]
fn test_mesh_rate_must_match_window() {
    let mut config = config("rbf");
    config.window.stride = 2;
    let source = NativeRateSource(source(10, 11));
    let result = run(config, &ApproachTable::with_defaults(), &source, &mut NullSink);
    assert!(matches!(result, Err(Track4dError::SchemaMismatch(msg)) if msg.ends_with("implies 5")));
}

#[test]
fn test_unknown_approach_fails_before_io() {
    let folder = scratch("unknown");
    let mut config = config("nope");
    config.export = true;
    config.export_folder = folder.clone();

    let source = UntouchedSource::default();
    let mut sink = ArtifactSink::new(&folder);
    let result = run(config, &ApproachTable::with_defaults(), &source, &mut sink);

    assert!(matches!(result, Err(Track4dError::UnknownApproach(name)) if name == "nope"));
    assert!(!source.touched.get());
    assert!(!folder.exists());
    assert!(sink.written().is_empty());
}

#[test]
fn test_disabled_evaluations_are_reported() {
    let mut config = config("rbf");
    config.evaluations.virtual_landmarks = false;
    config.evaluations.deformation_intensity = false;

    let report = run(config, &ApproachTable::with_defaults(), &source(10, 11), &mut NullSink).unwrap();
    assert!(report.metrics.control.computed().is_some());
    assert_eq!(report.metrics.virtual_landmarks, MetricOutcome::Disabled);
    assert_eq!(report.metrics.deformation_intensity, MetricOutcome::Disabled);
    assert_eq!(report.tracked, vec![CONTROL_TRACK]);
}

#[test]
fn test_failed_evaluation_does_not_stop_the_run() {
    let mut config = config("rbf");
    config.test_landmark_path = PathBuf::from("missing.json");

    let report = run(config, &ApproachTable::with_defaults(), &source(10, 11), &mut NullSink).unwrap();
    assert!(matches!(
        &report.metrics.virtual_landmarks,
        MetricOutcome::Failed { error } if error.contains("missing.json")
    ));
    assert!(report.metrics.control.computed().is_some());
    assert!(report.metrics.deformation_intensity.computed().is_some());
}

/// Marker-guided engine that loses the last frame of every query.
struct Truncating(usize);

impl RegistrationEngine for Truncating {
    fn name(&self) -> &'static str {
        "truncating"
    }
    fn add_frames(&mut self, frames: &MeshSequence) -> Result<()> {
        self.0 = frames.len();
        Ok(())
    }
    fn load_landmarks(&mut self, _: &str, _: &LandmarkSet) -> Result<()> {
        Ok(())
    }
    fn fit(&mut self, _: &FitParams) -> Result<()> {
        Ok(())
    }
    fn query(&mut self, point: Vec3, start_frame: usize) -> Result<Vec<Option<Vec3>>> {
        Ok((0..self.0 - 1).map(|f| (f >= start_frame).then_some(point)).collect())
    }
    fn frame_count(&self) -> usize {
        self.0
    }
}

#[test]
fn test_engine_failure_is_isolated_per_metric() {
    let mut table = ApproachTable::with_defaults();
    table.register(Approach::new(
        "truncating",
        Strategy::MarkerGuided,
        false,
        true,
        |_| Box::new(Truncating(0)),
    ));
    let report = run(config("truncating"), &table, &source(10, 11), &mut NullSink).unwrap();

    assert_eq!(report.metrics.control.status(), "failed");
    assert_eq!(report.metrics.virtual_landmarks.status(), "failed");
    assert_eq!(report.metrics.deformation_intensity.status(), "failed");
    assert!(report.tracked.is_empty());
}

#[test]
fn test_report_size_independent_of_mesh_resolution() {
    let mut sizes = Vec::new();
    for (tag, grid) in [("coarse", 11), ("fine", 61)] {
        let folder = scratch(&format!("size-{tag}"));
        let mut config = config("rbf");
        config.export = true;
        config.export_folder = folder.clone();
        // sampled surface points print with varying digit counts
        config.evaluations.deformation_intensity = false;

        let report = run(config, &ApproachTable::with_defaults(), &source(10, grid), &mut NullSink)
            .unwrap();
        assert_eq!(report.cropped_vertices, 10 * (grid * grid) as usize);

        let path = folder.join("benchmark.json");
        sizes.push(fs::metadata(&path).unwrap().len());
        let reread = RunReport::read(&path).unwrap();
        assert_eq!(reread.metrics, report.metrics);
        fs::remove_dir_all(&folder).unwrap();
    }
    assert!(sizes[0].abs_diff(sizes[1]) < 256, "report sizes {sizes:?}");
}

#[test]
fn test_staged_run() {
    let source = source(10, 11);
    let config = config("rbf");
    let table = ApproachTable::with_defaults();
    let approach = table.resolve("rbf").unwrap().clone();

    let loaded = LoadedRun::load(config, approach, &source).unwrap();
    assert_eq!(loaded.meshes().len(), 10);
    assert_eq!(loaded.landmarks().name(), "landmarks");
    assert_eq!(loaded.landmarks().frame_count(), Some(10));

    let mut implemented = loaded.implement().unwrap();
    implemented
        .adapter_mut()
        .track("extra", &[("p".to_string(), Vec3::new(50.0, 50.0, 0.0))], 0)
        .unwrap();
    let evaluated = implemented.evaluate(&source, &mut NullSink);
    assert!(evaluated.metrics().control.computed().is_some());
    let report = evaluated.export().unwrap();
    assert!(report.tracked.iter().any(|t| t == "extra"));
}
