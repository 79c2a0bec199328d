//! Error types for track4d.

use thiserror::Error;

/// The main error type for track4d operations.
#[derive(Error, Debug)]
pub enum Track4dError {
    /// A mesh or landmark source is missing or corrupt.
    #[error("data load error: {0}")]
    DataLoad(String),

    /// A marker has too few native samples to interpolate.
    #[error("marker '{marker}' has {count} native sample(s), at least 2 are required")]
    InsufficientSamples { marker: String, count: usize },

    /// The contour has no defined position at a mesh frame.
    #[error("contour undefined at frame {frame}")]
    UndefinedContour { frame: usize },

    /// The requested approach is not in the approach table.
    #[error("unknown approach '{0}'")]
    UnknownApproach(String),

    /// Two landmark sets disagree on marker names or frame counts.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A tracked keypoint set with the given name already exists.
    #[error("tracked set '{0}' already exists")]
    DuplicateTrack(String),

    /// A tracked keypoint set with the given name was not found.
    #[error("tracked set '{0}' not found")]
    TrackNotFound(String),

    /// A marker with the given name was not found.
    #[error("marker '{0}' not found")]
    MarkerNotFound(String),

    /// A frame index lies outside the available range.
    #[error("frame {frame} out of range (0..{len})")]
    FrameOutOfRange { frame: usize, len: usize },

    /// The registration engine failed.
    #[error("registration error: {0}")]
    Registration(String),

    /// A configuration value is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for track4d operations.
pub type Result<T> = std::result::Result<T, Track4dError>;
