#![no_main]

use libfuzzer_sys::fuzz_target;
use udimscan_core::{Analyzer, CancellationToken, MemoryScene, NoProgress};

fuzz_target!(|data: &[u8]| {
    let Ok(scene) = MemoryScene::from_slice(data) else {
        return;
    };

    let report = Analyzer::default()
        .analyze(&scene, &mut NoProgress, &CancellationToken::new())
        .expect("in-memory scenes never fail to list materials");

    for entry in report.material_tiles.iter() {
        assert!(!entry.tiles.is_empty());
        assert!(entry.tiles.iter().all(|t| t.number() >= 1001));
    }
    assert!(report.shared_tiles.values().all(|m| m.len() >= 2));
    for record in report.overlaps.records() {
        assert_ne!(record.face_a, record.face_b);
    }

    let _ = serde_json::to_vec(&report);
});
