//! Integration tests for the `udimscan` binary.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p udimscan-cli --test cli
//! ```

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

const OVERLAPPING_SCENE: &str = r#"{
    "materials": [
        {"name": "skin", "meshes": ["|char|body"]},
        {"name": "cloth", "meshes": ["|char|shirt"]}
    ],
    "meshes": [
        {
            "name": "|char|body",
            "uv_sets": [{"name": "map1", "u": [0.1, 0.6, 0.6, 0.1], "v": [0.1, 0.1, 0.6, 0.6]}],
            "faces": [[0, 1, 2, 3]]
        },
        {
            "name": "|char|shirt",
            "uv_sets": [{"name": "map1", "u": [0.4, 0.9, 0.9, 0.4], "v": [0.4, 0.4, 0.9, 0.9]}],
            "faces": [[0, 1, 2, 3]]
        }
    ]
}"#;

const CLEAN_SCENE: &str = r#"{
    "materials": [{"name": "wood", "meshes": ["crate"]}],
    "meshes": [{
        "name": "crate",
        "uv_sets": [{"name": "map1", "u": [0.0, 1.0, 1.0, 0.0], "v": [0.0, 0.0, 1.0, 1.0]}],
        "faces": [[0, 1, 2, 3]]
    }]
}"#;

fn udimscan(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_udimscan"))
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute udimscan")
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn test_clean_scene_passes() {
    let tmp = tempdir().unwrap();
    let input = write(tmp.path(), "scene.json", CLEAN_SCENE);

    let output = udimscan(&["analyze", "--input", &input, "--strict", "--quiet"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Expected success, got: {}", stdout);
    assert!(stdout.contains("Material: wood"));
    assert!(stdout.contains("  UDIM: 1001"));
    assert!(!stdout.contains("UDIM: 1002"));
    assert!(stdout.contains("No shared UDIMs found."));
    assert!(stdout.contains("No UV overlaps found."));
    assert!(stdout.contains("PASSED"));
}

#[test]
fn test_findings_fail_only_in_strict_mode() {
    let tmp = tempdir().unwrap();
    let input = write(tmp.path(), "scene.json", OVERLAPPING_SCENE);

    let lenient = udimscan(&["analyze", "--input", &input]);
    let stdout = String::from_utf8_lossy(&lenient.stdout);
    assert!(lenient.status.success(), "Expected success, got: {}", stdout);
    assert!(stdout.contains("body (skin) overlaps with shirt (cloth)"));

    let strict = udimscan(&["analyze", "--input", &input, "--strict"]);
    assert!(!strict.status.success());
    assert!(String::from_utf8_lossy(&strict.stdout).contains("FAILED"));
}

#[test]
fn test_progress_goes_to_stderr() {
    let tmp = tempdir().unwrap();
    let input = write(tmp.path(), "scene.json", CLEAN_SCENE);

    let output = udimscan(&["analyze", "--input", &input]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stderr.contains("Processing materials..."));
    assert!(stderr.contains("Completed!"));
    assert!(!stdout.contains("Processing materials..."));
}

#[test]
fn test_json_output_is_parseable() {
    let tmp = tempdir().unwrap();
    let input = write(tmp.path(), "scene.json", OVERLAPPING_SCENE);

    let output = udimscan(&["analyze", "--input", &input, "--json"]);
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["success"], true);
    assert_eq!(doc["summary"]["overlapping_face_pairs"], 1);
    assert_eq!(doc["summary"]["shared_tiles"], 1);
    assert_eq!(doc["report"]["overlaps"]["records"][0]["tile"], 1001);
}

#[test]
fn test_missing_input_json_error() {
    let output = udimscan(&["analyze", "--input", "/nonexistent/scene.glb", "--json"]);
    assert!(!output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["success"], false);
    assert!(doc["error"].as_str().unwrap().contains("File not found"));
}

#[test]
fn test_missing_input_text_error() {
    let output = udimscan(&["analyze", "--input", "/nonexistent/scene.glb"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("File not found"));
}

#[test]
fn test_tolerance_override_hides_shallow_overlap() {
    let tmp = tempdir().unwrap();
    let input = write(tmp.path(), "scene.json", OVERLAPPING_SCENE);

    let output = udimscan(&["analyze", "--input", &input, "--json", "--tolerance", "0.3"]);
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["summary"]["overlapping_face_pairs"], 0);
}

#[test]
fn test_init_config_round_trip() {
    let tmp = tempdir().unwrap();
    let config = tmp.path().join("udimscan.json");
    let config_str = config.to_str().unwrap();

    let output = udimscan(&["init-config", "--output", config_str]);
    assert!(output.status.success());
    assert!(config.exists());

    let again = udimscan(&["init-config", "--output", config_str]);
    assert!(!again.status.success());

    let input = write(tmp.path(), "scene.json", CLEAN_SCENE);
    let analyzed = udimscan(&["analyze", "--input", &input, "--config", config_str]);
    assert!(analyzed.status.success());
}
