//! UDIM tile usage and UV overlap analysis.
//!
//! Works out which UDIM tiles each material's meshes use, which tiles are
//! claimed by more than one material, and which faces have intersecting UV
//! bounding boxes inside the same tile.
//!
//! # Example
//!
//! ```
//! use udimscan_core::{Analyzer, CancellationToken, MemoryMesh, MemoryScene, NoProgress};
//!
//! let scene = MemoryScene::new()
//!     .with_material("skin", &["body"])
//!     .with_mesh(MemoryMesh::new("body").with_quad(0.1, 0.1, 0.9, 0.9));
//!
//! let report = Analyzer::default()
//!     .analyze(&scene, &mut NoProgress, &CancellationToken::new())
//!     .unwrap();
//!
//! assert!(report.is_clean());
//! ```

pub mod cancel;
pub mod config;
pub mod error;
pub mod mapper;
pub mod overlap;
pub mod pipeline;
pub mod report;
pub mod scene;
pub mod shared;
pub mod sink;
pub mod types;

pub use cancel::CancellationToken;
pub use config::{AnalysisConfig, TileAssignment, DEFAULT_TOLERANCE};
pub use error::{AnalysisError, ConfigError, MeshQueryError, SceneError};
pub use mapper::compute_material_tiles;
pub use overlap::compute_overlaps;
pub use pipeline::{Analyzer, Checkpoint};
pub use report::{
    AnalysisReport, Diagnostic, MaterialTileSet, MaterialTiles, MeshPairSummary, OverlapRecord,
    OverlapReport, OverlapsByTile, Phase, SharedTiles,
};
pub use scene::{load_mesh_uvs, MemoryMesh, MemoryScene, MeshUvData, SceneQuery};
pub use shared::compute_shared_tiles;
pub use sink::{NoProgress, PresentationSink, ProgressSink, RecordingSink};
pub use types::{FaceId, FaceRef, MaterialId, MeshId, UdimTile, UvBounds, UvSetId};
