//! CLI integration tests

use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const TOMATO_VARS: [&str; 10] = [
    "TOMATO_MODEL_PATH",
    "TOMATO_CLASSES_PATH",
    "TOMATO_CLASS_INDICES_JSON",
    "TOMATO_CLASSES",
    "TOMATO_IMAGE_SIZE",
    "TOMATO_USE_KERAS_LOADER",
    "TOMATO_AUTO_LEAF_CROP",
    "TOMATO_CENTER_CROP",
    "TOMATO_PREPROCESS",
    "TOMATO_ACTIVATION",
];

fn classify(args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tomato-classify"));
    for var in TOMATO_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG");
    cmd.args(args).envs(env.iter().copied());
    cmd.output().expect("Failed to execute command")
}

fn report(output: &Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1, "Should print one JSON line: {}", stdout);
    serde_json::from_str(stdout.trim()).expect("stdout should be JSON")
}

fn leaf_image(dir: &Path) -> String {
    let path = dir.join("leaf.png");
    image::RgbImage::from_pixel(32, 32, image::Rgb([60, 140, 50]))
        .save(&path)
        .unwrap();
    path.display().to_string()
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = classify(&["--help"], &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Classify a tomato leaf image"));
    assert!(stdout.contains("IMAGE_PATH"), "Should show image argument");
    assert!(stdout.contains("MODEL_PATH"), "Should show model argument");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = classify(&["--version"], &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("tomato-classify"), "Should show binary name");
}

/// Missing image is a JSON report, not a usage error
#[test]
fn test_missing_image_path() {
    let output = classify(&[], &[]);

    assert!(output.status.success(), "Errors are reported on stdout");
    assert_eq!(report(&output), serde_json::json!({"error": "missing_image_path"}));
}

#[test]
fn test_no_model_configured() {
    let dir = TempDir::new().unwrap();
    let image = leaf_image(dir.path());

    let output = classify(&[&image], &[]);

    assert!(output.status.success());
    let report = report(&output);
    assert_eq!(report["error"], "model_not_found");
    assert!(report.get("predicted_class").is_none());
}

#[test]
fn test_model_path_does_not_exist() {
    let dir = TempDir::new().unwrap();
    let image = leaf_image(dir.path());
    let model = dir.path().join("missing.onnx").display().to_string();

    let output = classify(&[&image, &model], &[]);

    let report = report(&output);
    assert_eq!(report["error"], "model_not_found");
    assert!(report["message"].as_str().unwrap().contains("missing.onnx"));
}

#[test]
fn test_unreadable_model_from_environment() {
    let dir = TempDir::new().unwrap();
    let image = leaf_image(dir.path());
    let model = dir.path().join("model.onnx");
    std::fs::write(&model, b"definitely not protobuf").unwrap();
    let model = model.display().to_string();

    let output = classify(&[&image], &[("TOMATO_MODEL_PATH", &model)]);

    assert_eq!(report(&output)["error"], "model_not_found");
}

#[test]
fn test_invalid_image_size() {
    let dir = TempDir::new().unwrap();
    let image = leaf_image(dir.path());

    let output = classify(&[&image], &[("TOMATO_IMAGE_SIZE", "huge")]);

    assert!(output.status.success());
    assert_eq!(report(&output)["error"], "invalid_config");
}

/// Logs stay on stderr even when enabled
#[test]
fn test_logs_do_not_touch_stdout() {
    let output = classify(&[], &[("RUST_LOG", "debug")]);

    assert_eq!(report(&output)["error"], "missing_image_path");
}
