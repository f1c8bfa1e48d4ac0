//! Material to UDIM tile mapping.

use crate::cancel::CancellationToken;
use crate::error::AnalysisError;
use crate::report::{Diagnostic, MaterialTiles, Phase};
use crate::scene::{load_mesh_uvs, MeshUvData, SceneQuery};
use crate::types::{MaterialId, UdimTile};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Computes the sorted set of UDIM tiles each material's meshes use.
///
/// Every UV referenced by every face of every shaded mesh contributes
/// `1001 + floor(u) + 10 * floor(v)`. Meshes that fail to load are skipped
/// and reported in `diagnostics`; materials left with no tiles are omitted.
/// Cancellation is checked before each material.
pub fn compute_material_tiles<S>(
    scene: &S,
    materials: &[MaterialId],
    diagnostics: &mut Vec<Diagnostic>,
    cancel: &CancellationToken,
) -> Result<MaterialTiles, AnalysisError>
where
    S: SceneQuery + ?Sized,
{
    let mut result = MaterialTiles::new();

    for material in materials {
        cancel.check()?;
        debug!(%material, "mapping material tiles");

        let meshes = match scene.material_meshes(material) {
            Ok(meshes) => meshes,
            Err(error) => {
                warn!(%material, %error, "skipping material");
                diagnostics.push(
                    Diagnostic::new(Phase::TileMapping, error.to_string()).with_material(material),
                );
                continue;
            }
        };

        let mut tiles = BTreeSet::new();
        for mesh in &meshes {
            let data = match load_mesh_uvs(scene, mesh) {
                Ok(data) => data,
                Err(error) => {
                    warn!(%material, %mesh, %error, "skipping mesh");
                    diagnostics.push(
                        Diagnostic::new(Phase::TileMapping, error.to_string())
                            .with_material(material)
                            .with_mesh(error.mesh()),
                    );
                    continue;
                }
            };

            let outside = collect_mesh_tiles(&data, &mut tiles);
            if outside > 0 {
                let mesh = data.mesh();
                warn!(%material, %mesh, outside, "UVs outside the UDIM range");
                diagnostics.push(
                    Diagnostic::new(
                        Phase::TileMapping,
                        format!(
                            "{} UV reference(s) outside the UDIM range (u in [0, 10), v >= 0)",
                            outside
                        ),
                    )
                    .with_material(material)
                    .with_mesh(mesh),
                );
            }
        }

        result.insert(material.clone(), tiles);
    }

    Ok(result)
}

/// Adds the tiles of every face-referenced UV to `tiles`.
///
/// Returns how many UV references had no tile.
pub(crate) fn collect_mesh_tiles(data: &MeshUvData, tiles: &mut BTreeSet<UdimTile>) -> usize {
    let mut outside = 0;
    for (face, bounds) in data.face_bounds_iter() {
        for (u, v) in data.face_uvs(face) {
            let u = tiling_coordinate(u, bounds.u_min, bounds.u_max);
            let v = tiling_coordinate(v, bounds.v_min, bounds.v_max);
            match UdimTile::from_uv(u, v) {
                Some(tile) => {
                    tiles.insert(tile);
                }
                None => outside += 1,
            }
        }
    }
    outside
}

/// A coordinate lying exactly on the integer upper edge of its face's box
/// belongs to the tile below, so a face covering `[0, 1]` stays in 1001.
fn tiling_coordinate(x: f64, min: f64, max: f64) -> f64 {
    if x == max && x > min && x == x.floor() {
        x - 1.0
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MemoryMesh, MemoryScene};
    use pretty_assertions::assert_eq;

    fn tiles_of(result: &MaterialTiles, material: &str) -> Vec<u32> {
        result
            .get(&MaterialId::new(material))
            .map(|t| t.iter().map(|t| t.number()).collect())
            .unwrap_or_default()
    }

    fn run(scene: &MemoryScene) -> (MaterialTiles, Vec<Diagnostic>) {
        let materials = scene.list_materials().unwrap();
        let mut diagnostics = Vec::new();
        let result =
            compute_material_tiles(scene, &materials, &mut diagnostics, &CancellationToken::new())
                .unwrap();
        (result, diagnostics)
    }

    #[test]
    fn test_unit_quad_maps_to_1001() {
        let scene = MemoryScene::new()
            .with_material("mat", &["quad"])
            .with_mesh(MemoryMesh::new("quad").with_quad(0.0, 0.0, 0.999, 0.999));

        let (result, diagnostics) = run(&scene);
        assert_eq!(tiles_of(&result, "mat"), vec![1001]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_full_unit_quad_stays_in_first_tile() {
        let scene = MemoryScene::new()
            .with_material("mat", &["quad"])
            .with_mesh(MemoryMesh::new("quad").with_quad(0.0, 0.0, 1.0, 1.0));

        let (result, _) = run(&scene);
        assert_eq!(tiles_of(&result, "mat"), vec![1001]);
    }

    #[test]
    fn test_face_crossing_border_uses_both_tiles() {
        let scene = MemoryScene::new()
            .with_material("mat", &["quad"])
            .with_mesh(MemoryMesh::new("quad").with_quad(0.5, 0.5, 1.5, 1.0));

        let (result, _) = run(&scene);
        assert_eq!(tiles_of(&result, "mat"), vec![1001, 1002]);
    }

    #[test]
    fn test_integer_upper_edge_belongs_to_tile_below() {
        // floor(2.0) alone would add 1003; the face lies entirely in 1002.
        let scene = MemoryScene::new()
            .with_material("mat", &["quad"])
            .with_mesh(MemoryMesh::new("quad").with_quad(1.5, 0.25, 2.0, 0.75));

        let (result, _) = run(&scene);
        assert_eq!(tiles_of(&result, "mat"), vec![1002]);
    }

    #[test]
    fn test_integer_lower_edge_keeps_floor() {
        let scene = MemoryScene::new()
            .with_material("mat", &["quad"])
            .with_mesh(MemoryMesh::new("quad").with_quad(2.0, 1.0, 2.5, 1.5));

        let (result, _) = run(&scene);
        assert_eq!(tiles_of(&result, "mat"), vec![1013]);
    }

    #[test]
    fn test_interior_uvs_follow_floor_formula() {
        let uvs = [(0.25, 0.75), (3.5, 0.1), (1.9, 2.2)];
        let mesh = MemoryMesh::new("tri").with_uvs("map1", &uvs).with_face(&[0, 1, 2]);
        let scene = MemoryScene::new().with_material("mat", &["tri"]).with_mesh(mesh);

        let (result, _) = run(&scene);
        let expected: Vec<u32> = {
            let mut t: Vec<u32> = uvs
                .iter()
                .map(|&(u, v)| 1001 + u.floor() as u32 + 10 * v.floor() as u32)
                .collect();
            t.sort();
            t
        };
        assert_eq!(tiles_of(&result, "mat"), expected);
    }

    #[test]
    fn test_tiles_sorted_across_meshes() {
        let scene = MemoryScene::new()
            .with_material("mat", &["a", "b"])
            .with_mesh(MemoryMesh::new("a").with_quad(2.1, 1.1, 2.9, 1.9))
            .with_mesh(MemoryMesh::new("b").with_quad(0.1, 0.1, 0.9, 0.9));

        let (result, _) = run(&scene);
        assert_eq!(tiles_of(&result, "mat"), vec![1001, 1013]);
    }

    #[test]
    fn test_material_without_uv_geometry_is_omitted() {
        let scene = MemoryScene::new()
            .with_material("textured", &["quad"])
            .with_material("bare_mat", &["bare"])
            .with_material("unused", &[])
            .with_mesh(MemoryMesh::new("quad").with_quad(1.1, 0.1, 1.9, 0.9))
            .with_mesh(MemoryMesh::new("bare"));

        let (result, diagnostics) = run(&scene);
        assert_eq!(result.len(), 1);
        assert_eq!(tiles_of(&result, "textured"), vec![1002]);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].mesh, Some("bare".into()));
        assert_eq!(diagnostics[0].material, Some("bare_mat".into()));
        assert_eq!(diagnostics[0].phase, Phase::TileMapping);
    }

    #[test]
    fn test_failed_mesh_does_not_abort_material() {
        let scene = MemoryScene::new()
            .with_material("mat", &["bad", "ghost", "good"])
            .with_mesh(MemoryMesh::failing("bad", "API error"))
            .with_mesh(MemoryMesh::new("good").with_quad(0.2, 0.2, 0.4, 0.4));

        let (result, diagnostics) = run(&scene);
        assert_eq!(tiles_of(&result, "mat"), vec![1001]);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].mesh, Some("bad".into()));
        assert_eq!(diagnostics[1].mesh, Some("ghost".into()));
    }

    #[test]
    fn test_out_of_range_uvs_are_reported_not_mapped() {
        let scene = MemoryScene::new()
            .with_material("mat", &["neg"])
            .with_mesh(MemoryMesh::new("neg").with_quad(-0.5, 0.2, 0.5, 0.4));

        let (result, diagnostics) = run(&scene);
        assert_eq!(tiles_of(&result, "mat"), vec![1001]);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.starts_with("2 UV reference(s)"));
        assert_eq!(diagnostics[0].mesh, Some("neg".into()));
    }

    #[test]
    fn test_cancelled_before_first_material() {
        let scene = MemoryScene::new()
            .with_material("mat", &["quad"])
            .with_mesh(MemoryMesh::new("quad").with_quad(0.1, 0.1, 0.2, 0.2));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let materials = scene.list_materials().unwrap();
        let result = compute_material_tiles(&scene, &materials, &mut Vec::new(), &cancel);
        assert_eq!(result, Err(AnalysisError::Cancelled));
    }
}
