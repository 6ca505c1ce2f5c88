//! Integration tests for the crownmap binary.

#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::prelude::*;
use image::{Rgb, RgbImage};
use predicates::prelude::*;
use std::process::Command;
use tempfile::tempdir;

fn crownmap() -> Command {
    Command::new(cargo_bin("crownmap"))
}

#[test]
fn test_help_lists_pipelines() {
    crownmap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("mask"))
        .stdout(predicate::str::contains("fuse"));
}

#[test]
fn test_fuse_run_writes_outputs() {
    let dir = tempdir().unwrap();
    let root = dir.path();

    std::fs::write(
        root.join("trees.csv"),
        "\u{feff}Latitude,Longitude,Species\n22.3000,114.1700,Banyan\n",
    )
    .unwrap();
    std::fs::write(
        root.join("frames.csv"),
        "image_name,tr_lat,tr_lon,bl_lat,bl_lon\npark_01,22.3010,114.1710,22.2990,114.1690\n",
    )
    .unwrap();
    std::fs::write(
        root.join("predictions.csv"),
        "xmin,ymin,xmax,ymax,label,score,image_path\n40,40,60,60,Tree,0.91,images/park_01.png\n",
    )
    .unwrap();
    RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]))
        .save(root.join("park_01.png"))
        .unwrap();

    crownmap()
        .arg("fuse")
        .arg("--inventory")
        .arg(root.join("trees.csv"))
        .arg("--metadata")
        .arg(root.join("frames.csv"))
        .arg("--predictions")
        .arg(root.join("predictions.csv"))
        .arg("--config")
        .arg(root.join("no-such-config.toml"))
        .arg("--image-extension")
        .arg("png")
        .arg("--no-progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("Complete:"));

    assert!(root.join("FUSED_park_01.png").exists());
    let table = std::fs::read_to_string(root.join("fused_crowns.csv")).unwrap();
    assert!(table.contains("Banyan"));
}

#[test]
fn test_missing_inventory_fails() {
    let dir = tempdir().unwrap();

    crownmap()
        .arg("mask")
        .arg("--inventory")
        .arg(dir.path().join("absent.csv"))
        .arg("--metadata")
        .arg(dir.path().join("frames.csv"))
        .arg("--config")
        .arg(dir.path().join("no-such-config.toml"))
        .arg("-q")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_negative_tolerance_rejected() {
    crownmap()
        .args([
            "mask",
            "--inventory",
            "trees.csv",
            "--metadata",
            "frames.csv",
            "--tolerance",
            "-0.5",
        ])
        .assert()
        .failure();
}
