#![no_main]

use libfuzzer_sys::fuzz_target;
use udimscan_core::{Analyzer, CancellationToken, NoProgress};
use udimscan_gltf::GltfScene;

fuzz_target!(|data: &[u8]| {
    if let Ok(scene) = GltfScene::from_slice(data) {
        let _ = Analyzer::default().analyze(&scene, &mut NoProgress, &CancellationToken::new());
    }
});
