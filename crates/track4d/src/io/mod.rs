//! Loading of captured data.
//!
//! A [`DataSource`] yields the windowed mesh sequence and landmark sets of a
//! run. [`FileSource`] reads them from disk; [`MemorySource`] serves data built
//! in code (synthetic benchmarks and tests).

mod landmarks;
mod obj;
mod ply;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use track4d_core::{FrameWindow, Result, TimeAxis, Track4dError};
use track4d_structures::{LandmarkSet, MeshFrame, MeshSequence};

pub use landmarks::{read_landmarks, write_landmark_sets, LandmarkFile, MarkerRecord};
pub use obj::read_obj;
pub use ply::{read_ply, write_ply};

/// Provider of the inputs of a benchmark run.
pub trait DataSource {
    /// Loads the frames of `window` from `path`.
    ///
    /// Frames past the end of the available data are dropped. The returned
    /// sequence runs at `origin_fps / window.stride`, starting at
    /// `window.start / origin_fps`.
    fn load_mesh_sequence(&self, path: &Path, window: FrameWindow, origin_fps: f64)
        -> Result<MeshSequence>;

    /// Loads the landmark set stored at `path`.
    fn load_landmarks(&self, path: &Path) -> Result<LandmarkSet>;
}

/// Time axis of the frames of `window` that are actually available.
#[allow(clippy::cast_precision_loss)]
fn window_axis(window: FrameWindow, origin_fps: f64, len: usize) -> Result<TimeAxis> {
    let stride = window.stride.max(1) as f64;
    TimeAxis::new(window.start as f64 / origin_fps, origin_fps / stride, len)
}

/// Reads meshes and landmarks from the file system.
///
/// Mesh folders hold one `.obj` or `.ply` file per native frame; files are
/// ordered by name. Landmarks are JSON files in the [`LandmarkFile`] layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl FileSource {
    /// Mesh files in `folder`, sorted by file name.
    pub fn mesh_files(folder: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(folder)
            .map_err(|e| Track4dError::DataLoad(format!("{}: {e}", folder.display())))?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_mesh = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("obj") || ext.eq_ignore_ascii_case("ply"));
            if is_mesh && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn read_mesh(path: &Path) -> Result<MeshFrame> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("obj") => read_obj(path),
            Some("ply") => read_ply(path),
            _ => Err(Track4dError::DataLoad(format!(
                "{}: unsupported mesh format",
                path.display()
            ))),
        }
    }
}

impl DataSource for FileSource {
    fn load_mesh_sequence(
        &self,
        path: &Path,
        window: FrameWindow,
        origin_fps: f64,
    ) -> Result<MeshSequence> {
        let files = Self::mesh_files(path)?;
        let selected: Vec<&PathBuf> = window.indices().filter_map(|i| files.get(i)).collect();
        if selected.is_empty() {
            return Err(Track4dError::DataLoad(format!(
                "{}: no mesh files in frames {}..{} ({} available)",
                path.display(),
                window.start,
                window.end,
                files.len()
            )));
        }

        let mut frames = Vec::with_capacity(selected.len());
        for file in selected {
            log::debug!("loading {}", file.display());
            frames.push(Self::read_mesh(file)?);
        }
        log::info!("loaded {} mesh frames from {}", frames.len(), path.display());

        let axis = window_axis(window, origin_fps, frames.len())?;
        let name = path
            .file_name()
            .map_or_else(|| "meshes".to_string(), |n| n.to_string_lossy().into_owned());
        MeshSequence::new(name, frames, axis)
    }

    fn load_landmarks(&self, path: &Path) -> Result<LandmarkSet> {
        read_landmarks(path)
    }
}

/// Serves data held in memory.
///
/// The mesh path is ignored: every load returns the window of the stored
/// sequence of native frames.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    frames: Vec<MeshFrame>,
    landmarks: HashMap<PathBuf, LandmarkSet>,
}

impl MemorySource {
    /// Creates a source over the native frames `frames`.
    pub fn new(frames: Vec<MeshFrame>) -> Self {
        Self {
            frames,
            landmarks: HashMap::new(),
        }
    }

    /// Stores `set` so that it loads from `path`.
    #[must_use]
    pub fn with_landmarks(mut self, path: impl Into<PathBuf>, set: LandmarkSet) -> Self {
        self.landmarks.insert(path.into(), set);
        self
    }
}

impl DataSource for MemorySource {
    fn load_mesh_sequence(
        &self,
        _path: &Path,
        window: FrameWindow,
        origin_fps: f64,
    ) -> Result<MeshSequence> {
        let frames: Vec<MeshFrame> = window
            .indices()
            .filter_map(|i| self.frames.get(i).cloned())
            .collect();
        if frames.is_empty() {
            return Err(Track4dError::DataLoad(format!(
                "no frames in {}..{} ({} available)",
                window.start,
                window.end,
                self.frames.len()
            )));
        }
        let axis = window_axis(window, origin_fps, frames.len())?;
        MeshSequence::new("meshes", frames, axis)
    }

    fn load_landmarks(&self, path: &Path) -> Result<LandmarkSet> {
        self.landmarks
            .get(path)
            .cloned()
            .ok_or_else(|| Track4dError::DataLoad(format!("{}: no such landmark set", path.display())))
    }
}
