//! Error types for quadterra

use thiserror::Error;

/// Main error type for the terrain core
#[derive(Debug, Error)]
pub enum Error {
    /// A subdivision was requested at an offset that is not the start of a cell.
    #[error("index {index} does not represent the start of a cell")]
    MalformedIndex { index: usize },

    /// Only centroid interpolation is implemented.
    #[error("non-centroid bilinear interpolation is not implemented")]
    UnsupportedInterpolation,

    /// A vertex run whose length is not a whole number of cells.
    #[error("{len} vertices do not form whole cells")]
    PartialCell { len: usize },

    #[error("invalid quadrant code {0} (expected 1-4)")]
    InvalidQuadrant(u8),

    /// A quadrant path walked into an unsubdivided cell or past the buffer end.
    #[error("section out of range at path step {step}: {reason}")]
    SectionOutOfRange { step: usize, reason: String },

    #[error("background worker unavailable: {0}")]
    WorkerUnavailable(String),

    #[error("background worker error: {0}")]
    Worker(String),

    /// A generator or selector has no registry tag and cannot cross a worker boundary.
    #[error("component cannot be offloaded: {0}")]
    UnregisteredComponent(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
