//! JSON landmark files.
//!
//! ```json
//! {
//!   "name": "landmarks",
//!   "markers": [
//!     { "name": "marker 0", "times": [0.0, 0.0083], "positions": [[1, 2, 3], [1, 2, 3.1]] }
//!   ]
//! }
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use track4d_core::{Result, Track4dError};
use track4d_structures::{LandmarkSet, Marker};

/// On-disk layout of a landmark set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkFile {
    #[serde(default)]
    pub name: Option<String>,
    pub markers: Vec<MarkerRecord>,
}

/// On-disk layout of one marker trajectory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub name: String,
    pub times: Vec<f64>,
    pub positions: Vec<[f32; 3]>,
}

impl LandmarkFile {
    /// Captures every marker of `set`.
    pub fn from_set(set: &LandmarkSet) -> Self {
        let markers = set
            .markers()
            .map(|m| MarkerRecord {
                name: m.name().to_string(),
                times: m.times().to_vec(),
                positions: m.positions().iter().map(|p| p.to_array()).collect(),
            })
            .collect();
        Self {
            name: Some(set.name().to_string()),
            markers,
        }
    }

    /// Builds a landmark set, naming it `fallback` if the file has no name.
    pub fn into_set(self, fallback: &str) -> Result<LandmarkSet> {
        let mut markers = Vec::with_capacity(self.markers.len());
        for record in self.markers {
            if record.times.len() != record.positions.len() {
                return Err(Track4dError::DataLoad(format!(
                    "marker '{}': {} times for {} positions",
                    record.name,
                    record.times.len(),
                    record.positions.len()
                )));
            }
            let samples = record
                .times
                .into_iter()
                .zip(record.positions.into_iter().map(Vec3::from_array))
                .collect();
            markers.push(Marker::new(record.name, samples)?);
        }
        LandmarkSet::new(self.name.unwrap_or_else(|| fallback.to_string()), markers)
    }
}

/// Reads a landmark set from a JSON file.
pub fn read_landmarks(path: &Path) -> Result<LandmarkSet> {
    let file = File::open(path)
        .map_err(|e| Track4dError::DataLoad(format!("{}: {e}", path.display())))?;
    let parsed: LandmarkFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| Track4dError::DataLoad(format!("{}: {e}", path.display())))?;
    let fallback = path
        .file_stem()
        .map_or_else(|| "landmarks".to_string(), |s| s.to_string_lossy().into_owned());
    let set = parsed.into_set(&fallback)?;
    log::info!("loaded {} markers from {}", set.len(), path.display());
    Ok(set)
}

/// Writes several landmark sets to one JSON file, as an array.
pub fn write_landmark_sets(path: &Path, sets: &[&LandmarkSet]) -> Result<()> {
    let records: Vec<LandmarkFile> = sets.iter().map(|s| LandmarkFile::from_set(s)).collect();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &records)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unordered_samples() {
        let json = r#"{
            "markers": [
                { "name": "m", "times": [0.2, 0.0, 0.1], "positions": [[2, 0, 0], [0, 0, 0], [1, 0, 0]] }
            ]
        }"#;
        let file: LandmarkFile = serde_json::from_str(json).unwrap();
        let set = file.into_set("fallback").unwrap();
        assert_eq!(set.name(), "fallback");
        let marker = set.marker("m").unwrap();
        assert_eq!(marker.times(), &[0.0, 0.1, 0.2]);
        assert_eq!(marker.positions()[2], Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let json = r#"{ "markers": [ { "name": "m", "times": [0.0], "positions": [] } ] }"#;
        let file: LandmarkFile = serde_json::from_str(json).unwrap();
        assert!(matches!(
            file.into_set("x"),
            Err(Track4dError::DataLoad(_))
        ));
    }

    #[test]
    fn test_missing_file_is_data_load_error() {
        assert!(matches!(
            read_landmarks(Path::new("/nonexistent/landmarks.json")),
            Err(Track4dError::DataLoad(_))
        ));
    }
}
