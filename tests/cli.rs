//! End-to-end tests for the `pictrikit` binary.
//!
//! Every test points `XDG_CONFIG_HOME` at a fresh temp dir so the user's own
//! configuration never leaks in.

use assert_cmd::Command;
use image::{Rgba, RgbaImage};
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_pictrikit");

fn cmd(home: &TempDir) -> Command {
    let mut cmd = Command::new(BIN);
    cmd.env("XDG_CONFIG_HOME", home.path())
        .env("PICTRIKIT_LOG", "error");
    cmd
}

fn write_png(dir: &Path, name: &str, w: u32, h: u32, color: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(w, h, Rgba(color))
        .save(&path)
        .expect("write png");
    path
}

fn png_size(path: &Path) -> (u32, u32) {
    image::image_dimensions(path).expect("read png dimensions")
}

// =========================================================================
// layouts
// =========================================================================

#[test]
fn test_layouts_lists_builtin_catalog() {
    let home = TempDir::new().expect("tempdir");
    cmd(&home)
        .arg("layouts")
        .assert()
        .success()
        .stdout(predicate::str::contains("horizontal-stack"))
        .stdout(predicate::str::contains("grid-2x2"))
        .stdout(predicate::str::contains("phone"));
}

#[test]
fn test_layouts_json() {
    let home = TempDir::new().expect("tempdir");
    let output = cmd(&home)
        .args(["layouts", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value.as_array().map(Vec::len), Some(21));
}

// =========================================================================
// compose
// =========================================================================

#[test]
fn test_compose_linear_row_export_size() {
    let home = TempDir::new().expect("tempdir");
    let work = TempDir::new().expect("tempdir");
    let a = write_png(work.path(), "a.png", 1000, 500, [200, 0, 0, 255]);
    let b = write_png(work.path(), "b.png", 400, 800, [0, 0, 200, 255]);
    let out = work.path().join("row.png");

    cmd(&home)
        .args(["compose", "--layout", "horizontal-stack"])
        .arg(&a)
        .arg(&b)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("2095x876"));
    assert_eq!(png_size(&out), (2095, 876));
}

#[test]
fn test_compose_grid_uses_fallback_density() {
    let home = TempDir::new().expect("tempdir");
    let work = TempDir::new().expect("tempdir");
    let images: Vec<PathBuf> = (0..4)
        .map(|i| write_png(work.path(), &format!("{i}.png"), 64, 48, [0, 120, 0, 255]))
        .collect();
    let out = work.path().join("grid.png");

    cmd(&home)
        .args(["compose", "-l", "grid-2x2"])
        .args(&images)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();
    assert_eq!(png_size(&out), (1800, 1120));
}

#[test]
fn test_compose_frame_with_transparent_corner() {
    let home = TempDir::new().expect("tempdir");
    let work = TempDir::new().expect("tempdir");
    let shot = write_png(work.path(), "shot.png", 300, 600, [255, 255, 0, 255]);
    let out = work.path().join("phone.png");

    cmd(&home)
        .args(["compose", "-l", "phone"])
        .arg(&shot)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();
    let framed = image::open(&out).expect("open").into_rgba8();
    assert_eq!(framed.dimensions(), (332, 680));
    assert_eq!(framed.get_pixel(0, 0).0[3], 0);
}

#[test]
fn test_compose_default_name_in_configured_dir() {
    let home = TempDir::new().expect("tempdir");
    let work = TempDir::new().expect("tempdir");
    let shot = write_png(work.path(), "shot.png", 20, 20, [1, 2, 3, 255]);
    let out_dir = work.path().join("exports");
    let config = work.path().join("custom.toml");
    std::fs::write(
        &config,
        format!(
            "[export]\noutput_dir = {:?}\nfile_prefix = \"board\"\n",
            out_dir.to_str().expect("utf8")
        ),
    )
    .expect("write config");

    cmd(&home)
        .arg("--config")
        .arg(&config)
        .args(["compose", "-l", "tablet"])
        .arg(&shot)
        .assert()
        .success();
    let names: Vec<String> = std::fs::read_dir(&out_dir)
        .expect("exports dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("board-") && names[0].ends_with(".png"));
}

#[test]
fn test_compose_without_images_fails_with_no_content() {
    let home = TempDir::new().expect("tempdir");
    let work = TempDir::new().expect("tempdir");
    let out = work.path().join("empty.png");
    cmd(&home)
        .args(["compose", "-l", "grid-2x2", "-o"])
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to export"));
    assert!(!out.exists());
}

#[test]
fn test_compose_unknown_layout_fails() {
    let home = TempDir::new().expect("tempdir");
    cmd(&home)
        .args(["compose", "-l", "collage"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown layout 'collage'"));
}

#[test]
fn test_compose_rejects_unsupported_file() {
    let home = TempDir::new().expect("tempdir");
    let work = TempDir::new().expect("tempdir");
    let gif = work.path().join("anim.gif");
    std::fs::write(&gif, b"GIF89a").expect("write");
    cmd(&home)
        .args(["compose", "-l", "phone"])
        .arg(&gif)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported image type"));
}

// =========================================================================
// preview
// =========================================================================

#[test]
fn test_preview_prints_tree_json() {
    let home = TempDir::new().expect("tempdir");
    let work = TempDir::new().expect("tempdir");
    let shot = write_png(work.path(), "shot.png", 40, 40, [9, 9, 9, 255]);
    let output = cmd(&home)
        .args(["preview", "-l", "before-after"])
        .arg(&shot)
        .output()
        .expect("run");
    assert!(output.status.success());
    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(tree["width"], 900.0);
    assert_eq!(tree["height"], 560.0);
    assert_eq!(tree["root"]["kind"]["type"], "canvas");
}

// =========================================================================
// config
// =========================================================================

#[test]
fn test_config_path_follows_xdg() {
    let home = TempDir::new().expect("tempdir");
    let expected = home.path().join("pictrikit").join("config.toml");
    cmd(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.to_str().expect("utf8")));
}

#[test]
fn test_config_init_then_validate() {
    let home = TempDir::new().expect("tempdir");
    cmd(&home)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration"));
    assert!(home.path().join("pictrikit/config.toml").exists());

    cmd(&home)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    cmd(&home)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_config_validate_reports_position() {
    let home = TempDir::new().expect("tempdir");
    let dir = home.path().join("pictrikit");
    std::fs::create_dir_all(&dir).expect("mkdir");
    std::fs::write(dir.join("config.toml"), "[canvas]\npadding = \n").expect("write");
    cmd(&home)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.toml:2:"));
}
