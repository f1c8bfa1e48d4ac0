//! Detection of UDIM tiles claimed by more than one material.

use crate::report::{MaterialTiles, SharedTiles};

/// Inverts the material to tiles mapping, keeping tiles with two or more materials.
///
/// Materials are listed in the order they appear in `material_tiles`.
pub fn compute_shared_tiles(material_tiles: &MaterialTiles) -> SharedTiles {
    let mut by_tile = SharedTiles::new();
    for entry in material_tiles.iter() {
        for &tile in &entry.tiles {
            let materials = by_tile.entry(tile).or_default();
            if !materials.contains(&entry.material) {
                materials.push(entry.material.clone());
            }
        }
    }
    by_tile.retain(|_, materials| materials.len() > 1);
    by_tile
}
