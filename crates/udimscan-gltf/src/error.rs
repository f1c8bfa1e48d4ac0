//! Errors raised while loading a glTF document.

use std::path::PathBuf;
use thiserror::Error;

/// The document could not be loaded at all.
///
/// Problems confined to one mesh, such as an unsupported texture coordinate
/// format, do not fail the load; they surface later as per-mesh query errors.
#[derive(Debug, Error)]
pub enum GltfSceneError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse glTF: {0}")]
    Parse(#[from] gltf::Error),
}
