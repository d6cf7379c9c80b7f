// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::Path;

use assert_cmd::Command;
use image::{Rgb, RgbImage};
use predicates::prelude::*;
use serde_json::Value;

fn segprop() -> Command {
    Command::cargo_bin("segprop").unwrap()
}

fn red_square(path: &Path, rect: [u32; 4]) {
    let mut mask = RgbImage::new(96, 96);
    for y in rect[1]..=rect[3] {
        for x in rect[0]..=rect[2] {
            mask.put_pixel(x, y, Rgb([255, 0, 0]));
        }
    }
    mask.save(path).unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_mask2json_single_mask() {
    let dir = tempfile::tempdir().unwrap();
    let mask = dir.path().join("frame_000001.png");
    red_square(&mask, [10, 10, 50, 50]);

    segprop()
        .args(["mask2json", "-i"])
        .arg(&mask)
        .arg("-o")
        .arg(dir.path().join("json"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let document = read_json(&dir.path().join("json").join("frame_000001.json"));

    assert_eq!(document["imageName"], "frame_000001.jpg");
    assert_eq!(document["classes"][0]["className"], "1");
    assert_eq!(document["classes"][0]["instances"][0]["instanceId"], "Object-1");
}

#[test]
fn test_mask2json_directory_with_meta() {
    let dir = tempfile::tempdir().unwrap();
    let masks = dir.path().join("Annotations");
    let json = dir.path().join("json");
    std::fs::create_dir_all(&masks).unwrap();

    red_square(&masks.join("frame_000001.png"), [10, 10, 50, 50]);
    segprop()
        .args(["mask2json", "-i"])
        .arg(masks.join("frame_000001.png"))
        .arg("-o")
        .arg(&json)
        .assert()
        .success();

    segprop()
        .args(["meta", "-r"])
        .arg(dir.path())
        .assert()
        .success();

    let meta_path = dir.path().join("predicted_masks").join("meta.json");
    let meta = read_json(&meta_path);
    assert_eq!(meta["frame_000002"][0]["bbox"], serde_json::json!([10, 10, 50, 50]));

    red_square(&masks.join("frame_000002.png"), [12, 11, 52, 51]);
    segprop()
        .args(["mask2json", "-t", "2", "-i"])
        .arg(&masks)
        .arg("-o")
        .arg(&json)
        .arg("-m")
        .arg(&meta_path)
        .assert()
        .success();

    let document = read_json(&json.join("frame_000002.json"));
    assert_eq!(document["classes"][0]["instances"][0]["instanceId"], "Object-1");
}

#[test]
fn test_mask2json_directory_skips_unreadable_mask() {
    let dir = tempfile::tempdir().unwrap();
    let masks = dir.path().join("Annotations");
    let json = dir.path().join("json");
    std::fs::create_dir_all(&masks).unwrap();

    red_square(&masks.join("frame_000001.png"), [10, 10, 50, 50]);
    std::fs::write(masks.join("frame_000002.png"), "not a png").unwrap();
    red_square(&masks.join("frame_000003.png"), [20, 20, 60, 60]);

    segprop()
        .args(["mask2json", "-i"])
        .arg(&masks)
        .arg("-o")
        .arg(&json)
        .assert()
        .success()
        .stderr(predicate::str::contains("frame_000002.png"))
        .stderr(predicate::str::contains("1 masks failed."));

    assert!(json.join("frame_000001.json").is_file());
    assert!(!json.join("frame_000002.json").exists());
    assert!(json.join("frame_000003.json").is_file());
}

#[test]
fn test_mask2json_invalid_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame_000001.txt");
    std::fs::write(&path, "not a mask").unwrap();

    segprop()
        .args(["mask2json", "-i"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("[segprop::mask2json] ERROR"));
}

#[test]
fn test_mask2json_invalid_threads() {
    segprop()
        .args(["mask2json", "-i", "masks/", "-t", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Threads must be set to a positive integer"));
}

#[test]
fn test_json2mask_restores_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let frames = dir.path().join("JPEGImages");
    let json = dir.path().join("json");
    std::fs::create_dir_all(&frames).unwrap();
    std::fs::create_dir_all(&json).unwrap();

    RgbImage::new(40, 30).save(frames.join("frame_000000.jpg")).unwrap();
    std::fs::write(
        json.join("frame_000000.json"),
        r#"{"imageName": "frame_000000.jpg", "classes": [{"className": "3", "instances": [
            {"instanceId": "Object-1", "name": "Object", "coordinates": [[5, 5], [20, 5], [20, 20], [5, 20]]}
        ]}]}"#,
    )
    .unwrap();

    segprop()
        .args(["json2mask", "-r"])
        .arg(dir.path())
        .assert()
        .success();

    let mask = image::open(dir.path().join("Annotations").join("frame_000000.png"))
        .unwrap()
        .to_rgb8();

    assert_eq!(mask.dimensions(), (40, 30));
    assert_eq!(mask.get_pixel(10, 10), &Rgb([0, 255, 0]));
    assert_eq!(mask.get_pixel(30, 25), &Rgb([0, 0, 0]));
}

#[test]
fn test_json2mask_directory_skips_malformed_document() {
    let dir = tempfile::tempdir().unwrap();
    let frames = dir.path().join("JPEGImages");
    let json = dir.path().join("json");
    let masks = dir.path().join("Annotations");
    std::fs::create_dir_all(&frames).unwrap();
    std::fs::create_dir_all(&json).unwrap();

    for frame in 0..3 {
        RgbImage::new(40, 30)
            .save(frames.join(format!("frame_{:06}.jpg", frame)))
            .unwrap();
    }

    std::fs::write(
        json.join("frame_000000.json"),
        r#"{"imageName": "frame_000000.jpg", "classes": [{"className": "1", "instances": [
            {"instanceId": "Object-1", "coordinates": [[5, 5], [20, 5], [20, 20]]}
        ]}]}"#,
    )
    .unwrap();
    std::fs::write(json.join("frame_000001.json"), "{ \"imageName\": ").unwrap();
    std::fs::write(
        json.join("frame_000002.json"),
        r#"{"imageName": "frame_000002.jpg", "classes": [{"className": "1", "instances": [
            {"instanceId": "Object-1", "coordinates": [[-1e12, 0], [1e12, 0], [0, 5]]}
        ]}]}"#,
    )
    .unwrap();

    segprop()
        .args(["json2mask", "-t", "2", "-r"])
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("frame_000001.json"))
        .stderr(predicate::str::contains("1 documents failed."));

    assert!(masks.join("frame_000000.png").is_file());
    assert!(!masks.join("frame_000001.png").exists());

    let mask = image::open(masks.join("frame_000002.png")).unwrap().to_rgb8();
    assert_eq!(mask.get_pixel(39, 0), &Rgb([255, 0, 0]));
}

#[test]
fn test_propagate_frame_zero() {
    let dir = tempfile::tempdir().unwrap();

    let output = segprop()
        .args(["propagate", "0", "--predictor", "segprop-test-no-such-program", "-r"])
        .arg(dir.path())
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();

    let result: Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(result["success"], false);
    assert!(result["error"].as_str().unwrap().contains("MissingInput"));
    assert!(!dir.path().join("temp_frames").exists());
}

#[cfg(unix)]
#[test]
fn test_propagate_with_external_predictor() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("sequence");
    let frames = root.join("JPEGImages");
    let masks = root.join("Annotations");
    std::fs::create_dir_all(&frames).unwrap();
    std::fs::create_dir_all(&masks).unwrap();

    RgbImage::new(96, 96).save(frames.join("frame_000000.jpg")).unwrap();
    RgbImage::new(96, 96).save(frames.join("frame_000001.jpg")).unwrap();
    red_square(&masks.join("frame_000000.png"), [10, 10, 50, 50]);

    segprop()
        .args(["mask2json", "-r"])
        .arg(&root)
        .arg("-i")
        .arg(masks.join("frame_000000.png"))
        .assert()
        .success();

    // Copies the reference mask forward as the prediction
    let script = dir.path().join("predict.sh");
    std::fs::write(
        &script,
        r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    --masks) M="$2"; shift 2 ;;
    --output) O="$2"; shift 2 ;;
    --reference) R="$2"; shift 2 ;;
    *) shift ;;
  esac
done
mkdir -p "$O/masks"
cp "$M/$(printf 'frame_%06d.png' "$R")" "$O/masks/$(printf 'frame_%06d.png' $((R + 1)))"
"#,
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    segprop()
        .args(["propagate", "1", "--predictor"])
        .arg(&script)
        .arg("-r")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""success":true"#));

    let document = read_json(&root.join("json").join("frame_000001.json"));

    assert_eq!(document["classes"][0]["instances"][0]["instanceId"], "Object-1");
    assert!(masks.join("frame_000001.png").is_file());
    assert!(!root.join("temp_frames").exists());
    assert!(!root.join("temp_masks").exists());
    assert!(!root.join(".segprop.lock").exists());
}
