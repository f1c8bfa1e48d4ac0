//! Error types for scene queries and analysis runs.

use crate::types::{FaceId, MeshId};
use thiserror::Error;

/// A per-mesh query failure.
///
/// These are recoverable: the analysis skips the mesh, records a
/// diagnostic and keeps going.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshQueryError {
    /// The mesh has no UV set at all.
    #[error("mesh '{mesh}' has no UV set")]
    NoUvSet { mesh: MeshId },

    /// The mesh is referenced by a material but no longer resolves.
    #[error("mesh '{mesh}' is detached or does not exist")]
    Detached { mesh: MeshId },

    /// The u and v arrays of a UV set have different lengths.
    #[error("mesh '{mesh}' has {u_count} u values but {v_count} v values")]
    MismatchedUvArrays {
        mesh: MeshId,
        u_count: usize,
        v_count: usize,
    },

    /// A face references a UV index past the end of the UV arrays.
    #[error("mesh '{mesh}' face {face} references UV index {index} but only {uv_count} UVs exist")]
    UvIndexOutOfRange {
        mesh: MeshId,
        face: FaceId,
        index: usize,
        uv_count: usize,
    },

    /// A face index past the mesh's face count was requested.
    #[error("mesh '{mesh}' has no face {face}")]
    FaceOutOfRange { mesh: MeshId, face: FaceId },

    /// The host geometry API failed for another reason.
    #[error("geometry query failed for mesh '{mesh}': {message}")]
    Backend { mesh: MeshId, message: String },
}

impl MeshQueryError {
    /// The mesh the failure refers to.
    pub fn mesh(&self) -> &MeshId {
        match self {
            MeshQueryError::NoUvSet { mesh }
            | MeshQueryError::Detached { mesh }
            | MeshQueryError::MismatchedUvArrays { mesh, .. }
            | MeshQueryError::UvIndexOutOfRange { mesh, .. }
            | MeshQueryError::FaceOutOfRange { mesh, .. }
            | MeshQueryError::Backend { mesh, .. } => mesh,
        }
    }
}

/// The scene itself could not be enumerated.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("scene query failed: {message}")]
pub struct SceneError {
    pub message: String,
}

impl SceneError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fatal analysis failures. No partial results accompany these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Listing the scene's materials failed.
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// The run was cancelled through its [`CancellationToken`](crate::CancellationToken).
    #[error("analysis cancelled")]
    Cancelled,
}

/// Errors from loading or validating an [`AnalysisConfig`](crate::AnalysisConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the config JSON.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value outside its accepted range.
    #[error("invalid config value for '{field}': {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
}
