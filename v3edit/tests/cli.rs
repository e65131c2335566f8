//! CLI integration tests against the fixture resource tree.
//!
//! Uses `assert_cmd` with `CARGO_BIN_EXE_v3edit` to run the pre-built binary.

use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};
use v3edit::testing::write_resources;

fn workspace() -> TempDir {
    let dir = tempdir().unwrap();
    write_resources(&dir.path().join("res"));
    dir
}

/// Runs from inside `dir` so the default `exports/` lands there.
fn v3edit(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_v3edit"));
    cmd.current_dir(dir).args([
        "--resources",
        dir.join("res").to_str().unwrap(),
        "--settings",
        dir.join("editor_settings.json").to_str().unwrap(),
        "--log-level",
        "warn",
    ]);
    cmd
}

/// The single timestamped export directory.
fn export_dir(dir: &Path) -> PathBuf {
    let mut entries: Vec<_> = fs::read_dir(dir.join("exports"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1);
    entries.pop().unwrap()
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_v3edit"));
    cmd.arg("--help").assert().success().stdout(contains("replay"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_v3edit"));
    cmd.arg("--version").assert().success();
}

#[test]
fn test_cli_render_single_layer() {
    let dir = workspace();
    let out = dir.path().join("out");
    v3edit(dir.path())
        .args(["render", "--layer", "low_wheat", "--out", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Rendered low_wheat"));

    let layer = image::open(out.join("low_wheat.png")).unwrap().to_rgb8();
    assert_eq!(layer.dimensions(), (6, 2));
    assert_eq!(layer.get_pixel(0, 0).0, [10, 10, 10]);
    assert_eq!(layer.get_pixel(5, 1).0, [200, 200, 200]);
}

#[test]
fn test_cli_inspect() {
    let dir = workspace();
    v3edit(dir.path())
        .args(["inspect", "--x", "0", "--y", "1"])
        .assert()
        .success()
        .stdout(contains("Region: FF0000"))
        .stdout(contains("State: SKANE"))
        .stdout(contains("Terrain: plains"))
        .stdout(contains("Climate: Cfa Humid subtropical"));
}

#[test]
fn test_cli_inspect_outside() {
    let dir = workspace();
    v3edit(dir.path())
        .args(["inspect", "--x", "-1", "--y", "0"])
        .assert()
        .success()
        .stdout(contains("outside the map"));
}

#[test]
fn test_cli_paint_and_export() {
    let dir = workspace();
    v3edit(dir.path())
        .args([
            "paint", "--layer", "climate", "--label", "BWh", "--at", "2,0", "--at", "99,99",
            "--export",
        ])
        .assert()
        .success()
        .stdout(contains("00FF00 climate -> BWh"))
        .stdout(contains("OutOfBounds"));

    let export = export_dir(dir.path());
    let climate = fs::read_to_string(export.join("climate.csv")).unwrap();
    assert_eq!(climate, "0000FF,BWh\n00FF00,BWh\nFF0000,Cfa\n");

    let project = fs::read_to_string(export.join("project_state.json")).unwrap();
    assert!(project.contains("\"location_HEX\": \"00FF00\""));
    assert!(project.contains("\"current_map_type\": \"climate\""));
}

#[test]
fn test_cli_paint_unknown_label_fails() {
    let dir = workspace();
    v3edit(dir.path())
        .args(["paint", "--layer", "climate", "--label", "Nope", "--at", "0,0"])
        .assert()
        .failure()
        .stderr(contains("Unknown label 'Nope'"));
}

#[test]
fn test_cli_replay() {
    let dir = workspace();
    let project = dir.path().join("project_state.json");
    fs::write(
        &project,
        r#"{
            "undo_stack": [
                {"map_type": "climate", "location_HEX": "00FF00", "old_feature": "", "new_feature": "Cfa"},
                {"map_type": "low_wheat", "location_HEX": "FF0000", "old_feature": "10", "new_feature": "99"},
                {"map_type": "climate", "location_HEX": "00FF00", "old_feature": "Cfa", "new_feature": "BWh"}
            ],
            "current_map_type": "climate",
            "loaded_maps": ["climate", "low_wheat"]
        }"#,
    )
    .unwrap();
    let out = dir.path().join("out");

    v3edit(dir.path())
        .args([
            "replay",
            "--project",
            project.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
            "--export",
        ])
        .assert()
        .success()
        .stdout(contains("Replayed 2 of 2 changes (0 skipped, 1 regions repainted)"));

    let climate = image::open(out.join("climate.png")).unwrap().to_rgb8();
    assert_eq!(climate.get_pixel(2, 0).0, [0xE6, 0xB4, 0x50]);

    let export = export_dir(dir.path());
    let wheat = fs::read_to_string(export.join("low_wheat.csv")).unwrap();
    assert!(wheat.contains("FF0000,10"));
    let project = fs::read_to_string(export.join("project_state.json")).unwrap();
    assert_eq!(project.matches("location_HEX").count(), 2);
}

#[test]
fn test_cli_export() {
    let dir = workspace();
    v3edit(dir.path()).arg("export").assert().success();

    let export = export_dir(dir.path());
    let wheat = fs::read_to_string(export.join("low_wheat.csv")).unwrap();
    assert_eq!(wheat, "0000FF,200\n00FF00,100\nFF0000,10\n");
    assert!(export.join("topography.csv").exists());
}

#[test]
fn test_cli_missing_resources_fails() {
    let dir = tempdir().unwrap();
    v3edit(dir.path())
        .args(["inspect", "--x", "0", "--y", "0"])
        .assert()
        .failure();
}

#[test]
fn test_cli_inspect_by_name() {
    let dir = workspace();
    v3edit(dir.path())
        .args(["inspect", "--name", "svea"])
        .assert()
        .success()
        .stdout(contains("Region: 0000FF"))
        .stdout(contains("State: SVEALAND"))
        .stdout(contains("Climate: BWh"));

    v3edit(dir.path())
        .args(["inspect", "--name", "gotland"])
        .assert()
        .success()
        .stdout(contains("No state name starts with 'gotland'"));
}
