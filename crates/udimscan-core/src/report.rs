//! Analysis result types for structured output.

use crate::types::{FaceRef, MaterialId, MeshId, UdimTile};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Tiles used by one material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialTileSet {
    pub material: MaterialId,
    /// Sorted ascending.
    pub tiles: BTreeSet<UdimTile>,
}

/// Material to tile-set mapping, in scene material order.
///
/// Only materials with at least one tile are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialTiles {
    entries: Vec<MaterialTileSet>,
}

impl MaterialTiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds tiles for `material`, merging with an existing entry.
    ///
    /// An empty tile set is ignored so materials without UV-bearing
    /// geometry never appear.
    pub fn insert(&mut self, material: MaterialId, tiles: BTreeSet<UdimTile>) {
        if tiles.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|e| e.material == material) {
            Some(entry) => entry.tiles.extend(tiles),
            None => self.entries.push(MaterialTileSet { material, tiles }),
        }
    }

    /// Tiles of `material`, if it has any.
    pub fn get(&self, material: &MaterialId) -> Option<&BTreeSet<UdimTile>> {
        self.entries
            .iter()
            .find(|e| &e.material == material)
            .map(|e| &e.tiles)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterialTileSet> {
        self.entries.iter()
    }

    /// Every tile used by any material, ascending.
    pub fn all_tiles(&self) -> BTreeSet<UdimTile> {
        self.entries
            .iter()
            .flat_map(|e| e.tiles.iter().copied())
            .collect()
    }

    /// Materials owning `tile`, in material order.
    pub fn materials_in(&self, tile: UdimTile) -> impl Iterator<Item = &MaterialId> {
        self.entries
            .iter()
            .filter(move |e| e.tiles.contains(&tile))
            .map(|e| &e.material)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Tiles used by two or more materials, with those materials in first-seen order.
pub type SharedTiles = BTreeMap<UdimTile, Vec<MaterialId>>;

/// One overlapping face pair found in a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapRecord {
    pub tile: UdimTile,
    pub face_a: FaceRef,
    pub material_a: MaterialId,
    pub face_b: FaceRef,
    pub material_b: MaterialId,
}

impl OverlapRecord {
    /// True when both faces belong to the same mesh.
    pub fn is_self_overlap(&self) -> bool {
        self.face_a.mesh == self.face_b.mesh
    }

    fn pair_key(&self) -> (FaceRef, FaceRef) {
        canonical_pair(&self.face_a, &self.face_b)
    }
}

/// Orders two faces so `{a, b}` and `{b, a}` produce the same key.
pub(crate) fn canonical_pair(a: &FaceRef, b: &FaceRef) -> (FaceRef, FaceRef) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

/// An overlapping mesh, seen from one mesh: `(other mesh, own material, other material)`.
pub type MeshOverlap = (MeshId, MaterialId, MaterialId);

/// Tile to mesh to overlapping-mesh view of an [`OverlapReport`].
pub type OverlapsByTile = BTreeMap<UdimTile, BTreeMap<MeshId, BTreeSet<MeshOverlap>>>;

/// Mesh-level summary of the face overlaps in one tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshPairSummary {
    pub mesh_a: MeshId,
    pub material_a: MaterialId,
    pub mesh_b: MeshId,
    pub material_b: MaterialId,
    /// Number of overlapping face pairs between the two meshes.
    pub face_pairs: usize,
}

impl MeshPairSummary {
    pub fn is_self_overlap(&self) -> bool {
        self.mesh_a == self.mesh_b
    }
}

/// All overlapping face pairs, each unordered pair at most once.
///
/// Deserializing replays the records through [`OverlapReport::record`], so
/// the pair index is rebuilt and duplicate pairs are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RecordList")]
pub struct OverlapReport {
    records: Vec<OverlapRecord>,
    #[serde(skip)]
    seen: HashSet<(FaceRef, FaceRef)>,
}

#[derive(Deserialize)]
struct RecordList {
    records: Vec<OverlapRecord>,
}

impl From<RecordList> for OverlapReport {
    fn from(list: RecordList) -> Self {
        let mut report = OverlapReport::new();
        for record in list.records {
            report.record(record);
        }
        report
    }
}

impl OverlapReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pair unless it (in either order) was already recorded.
    ///
    /// Returns `false` for a duplicate or for a face paired with itself.
    pub fn record(&mut self, record: OverlapRecord) -> bool {
        if record.face_a == record.face_b {
            return false;
        }
        if !self.seen.insert(record.pair_key()) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// True if the unordered pair `{a, b}` has been recorded.
    pub fn contains_pair(&self, a: &FaceRef, b: &FaceRef) -> bool {
        self.seen.contains(&canonical_pair(a, b))
    }

    pub fn records(&self) -> &[OverlapRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Tiles with at least one overlap, ascending.
    pub fn tiles(&self) -> BTreeSet<UdimTile> {
        self.records.iter().map(|r| r.tile).collect()
    }

    /// Records in `tile`, in discovery order.
    pub fn in_tile(&self, tile: UdimTile) -> impl Iterator<Item = &OverlapRecord> {
        self.records.iter().filter(move |r| r.tile == tile)
    }

    /// Nested per-tile, per-mesh view.
    ///
    /// Each record is listed under its first mesh as `(mesh_b, material_a,
    /// material_b)` and, when the meshes differ, mirrored under the second
    /// mesh as `(mesh_a, material_b, material_a)`. A self-overlap appears once.
    pub fn by_tile(&self) -> OverlapsByTile {
        let mut view = OverlapsByTile::new();
        for r in &self.records {
            let meshes = view.entry(r.tile).or_default();
            meshes.entry(r.face_a.mesh.clone()).or_default().insert((
                r.face_b.mesh.clone(),
                r.material_a.clone(),
                r.material_b.clone(),
            ));
            if r.face_a.mesh != r.face_b.mesh {
                meshes.entry(r.face_b.mesh.clone()).or_default().insert((
                    r.face_a.mesh.clone(),
                    r.material_b.clone(),
                    r.material_a.clone(),
                ));
            }
        }
        view
    }

    /// Overlaps in `tile` collapsed to unordered mesh pairs, in discovery order.
    ///
    /// The first record of a mesh pair decides the materials shown.
    pub fn mesh_pairs(&self, tile: UdimTile) -> Vec<MeshPairSummary> {
        let mut summaries: Vec<MeshPairSummary> = Vec::new();
        for r in self.in_tile(tile) {
            let existing = summaries.iter_mut().find(|s| {
                (s.mesh_a == r.face_a.mesh && s.mesh_b == r.face_b.mesh)
                    || (s.mesh_a == r.face_b.mesh && s.mesh_b == r.face_a.mesh)
            });
            match existing {
                Some(summary) => summary.face_pairs += 1,
                None => summaries.push(MeshPairSummary {
                    mesh_a: r.face_a.mesh.clone(),
                    material_a: r.material_a.clone(),
                    mesh_b: r.face_b.mesh.clone(),
                    material_b: r.material_b.clone(),
                    face_pairs: 1,
                }),
            }
        }
        summaries
    }
}

/// Analysis phase a diagnostic was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    TileMapping,
    OverlapDetection,
}

/// A recoverable problem that caused a mesh or some of its UVs to be skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<MeshId>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(phase: Phase, message: impl Into<String>) -> Self {
        Self {
            phase,
            material: None,
            mesh: None,
            message: message.into(),
        }
    }

    pub fn with_material(mut self, material: &MaterialId) -> Self {
        self.material = Some(material.clone());
        self
    }

    pub fn with_mesh(mut self, mesh: &MeshId) -> Self {
        self.mesh = Some(mesh.clone());
        self
    }
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub material_tiles: MaterialTiles,
    pub shared_tiles: SharedTiles,
    pub overlaps: OverlapReport,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisReport {
    /// True when no tile is shared and no UVs overlap.
    pub fn is_clean(&self) -> bool {
        self.shared_tiles.is_empty() && self.overlaps.is_empty()
    }
}
