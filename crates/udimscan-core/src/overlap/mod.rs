//! Bounding-box UV overlap detection within UDIM tiles.
//!
//! For each tile used by some material, every face of every mesh shaded by a
//! material owning that tile becomes a candidate if its UV box belongs to the
//! tile (see [`TileAssignment`]). Candidates are compared pairwise with a
//! strict, tolerance-shrunk box test. This is an approximation: two faces
//! whose boxes intersect are reported even if the polygons themselves do not.
//!
//! Pairs are deduplicated globally on the unordered `(mesh, face)` pair, so a
//! pair surfaced again by another tile or another material is not recorded
//! twice.


use crate::cancel::CancellationToken;
use crate::config::{AnalysisConfig, TileAssignment};
use crate::error::AnalysisError;
use crate::report::{Diagnostic, MaterialTiles, OverlapRecord, OverlapReport, Phase};
use crate::scene::{load_mesh_uvs, MeshUvData, SceneQuery};
use crate::types::{FaceRef, MaterialId, MeshId, UdimTile, UvBounds};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// A face taking part in one tile's pairwise comparison.
#[derive(Debug, Clone)]
struct Candidate {
    bounds: UvBounds,
    face: FaceRef,
    material: MaterialId,
}

/// Per-run memo of scene lookups, so a failing mesh is reported once.
struct GeometryCache<'s, S: ?Sized> {
    scene: &'s S,
    material_meshes: HashMap<MaterialId, Vec<MeshId>>,
    mesh_uvs: HashMap<MeshId, Option<MeshUvData>>,
}

impl<'s, S> GeometryCache<'s, S>
where
    S: SceneQuery + ?Sized,
{
    fn new(scene: &'s S) -> Self {
        Self {
            scene,
            material_meshes: HashMap::new(),
            mesh_uvs: HashMap::new(),
        }
    }

    fn material_meshes(
        &mut self,
        material: &MaterialId,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> &[MeshId] {
        let scene = self.scene;
        self.material_meshes
            .entry(material.clone())
            .or_insert_with(|| match scene.material_meshes(material) {
                Ok(meshes) => meshes,
                Err(error) => {
                    warn!(%material, %error, "skipping material");
                    diagnostics.push(
                        Diagnostic::new(Phase::OverlapDetection, error.to_string())
                            .with_material(material),
                    );
                    Vec::new()
                }
            })
            .as_slice()
    }

    fn mesh_uvs(
        &mut self,
        mesh: &MeshId,
        material: &MaterialId,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<&MeshUvData> {
        let scene = self.scene;
        self.mesh_uvs
            .entry(mesh.clone())
            .or_insert_with(|| match load_mesh_uvs(scene, mesh) {
                Ok(data) => Some(data),
                Err(error) => {
                    warn!(%material, %mesh, %error, "skipping mesh");
                    diagnostics.push(
                        Diagnostic::new(Phase::OverlapDetection, error.to_string())
                            .with_material(material)
                            .with_mesh(error.mesh()),
                    );
                    None
                }
            })
            .as_ref()
    }
}

/// Finds overlapping face pairs in every tile of `material_tiles`.
///
/// Tiles are processed in ascending order and cancellation is checked
/// before each one. Meshes whose geometry cannot be read are left out of
/// the candidate lists and reported in `diagnostics`.
pub fn compute_overlaps<S>(
    scene: &S,
    material_tiles: &MaterialTiles,
    config: &AnalysisConfig,
    diagnostics: &mut Vec<Diagnostic>,
    cancel: &CancellationToken,
) -> Result<OverlapReport, AnalysisError>
where
    S: SceneQuery + ?Sized,
{
    let mut report = OverlapReport::new();
    let mut cache = GeometryCache::new(scene);

    for tile in material_tiles.all_tiles() {
        cancel.check()?;

        let candidates = collect_candidates(
            &mut cache,
            material_tiles,
            tile,
            config.tile_assignment,
            diagnostics,
        );
        let found = compare_candidates(tile, &candidates, config.tolerance, &mut report);
        debug!(%tile, candidates = candidates.len(), found, "checked tile");
    }

    Ok(report)
}

fn collect_candidates<S>(
    cache: &mut GeometryCache<'_, S>,
    material_tiles: &MaterialTiles,
    tile: UdimTile,
    assignment: TileAssignment,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Candidate>
where
    S: SceneQuery + ?Sized,
{
    let mut candidates = Vec::new();
    let mut visited: HashSet<(MaterialId, MeshId)> = HashSet::new();

    for material in material_tiles.materials_in(tile) {
        let meshes = cache.material_meshes(material, diagnostics).to_vec();
        for mesh in meshes {
            if !visited.insert((material.clone(), mesh.clone())) {
                continue;
            }
            let Some(data) = cache.mesh_uvs(&mesh, material, diagnostics) else {
                continue;
            };
            for (face, bounds) in data.face_bounds_iter() {
                if belongs_to(assignment, &bounds, tile) {
                    candidates.push(Candidate {
                        bounds,
                        face: FaceRef::new(data.mesh().clone(), face),
                        material: material.clone(),
                    });
                }
            }
        }
    }

    candidates
}

fn belongs_to(assignment: TileAssignment, bounds: &UvBounds, tile: UdimTile) -> bool {
    match assignment {
        TileAssignment::MinCorner => bounds.originates_in(tile),
        TileAssignment::Spanned => bounds.touches(tile),
    }
}

/// Compares each unordered candidate pair once and records overlaps.
///
/// Returns the number of new records.
fn compare_candidates(
    tile: UdimTile,
    candidates: &[Candidate],
    tolerance: f64,
    report: &mut OverlapReport,
) -> usize {
    let mut found = 0;
    for (i, a) in candidates.iter().enumerate() {
        for b in &candidates[i + 1..] {
            if a.face == b.face || !a.bounds.overlaps(&b.bounds, tolerance) {
                continue;
            }
            let recorded = report.record(OverlapRecord {
                tile,
                face_a: a.face.clone(),
                material_a: a.material.clone(),
                face_b: b.face.clone(),
                material_b: b.material.clone(),
            });
            if recorded {
                found += 1;
            }
        }
    }
    found
}
