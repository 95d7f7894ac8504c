//! Tomato leaf classifier
//!
//! Runs the image pipeline once and prints a single JSON object on stdout:
//! either the prediction or `{"error": kind, "message": ...}`. The process
//! exits 0 in both cases; callers inspect the `error` field.

use blight_lib::{classify, init_tracing, ClassifierConfig, ClassifyReport, ErrorReport};
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

/// Tomato leaf disease classifier
#[derive(Parser)]
#[command(name = "tomato-classify")]
#[command(author, version, about = "Classify a tomato leaf image", long_about = None)]
struct Cli {
    /// Image to classify
    image_path: Option<PathBuf>,

    /// Model file, overriding TOMATO_MODEL_PATH
    model_path: Option<PathBuf>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let report = match ClassifierConfig::load() {
        Ok(config) => {
            debug!(?config, "Classifier configured");
            ClassifyReport::from(classify(
                &config,
                cli.image_path.as_deref(),
                cli.model_path.as_deref(),
            ))
        }
        Err(e) => ClassifyReport::Error(ErrorReport::from(&e)),
    };

    match serde_json::to_string(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => println!(
            "{}",
            serde_json::json!({ "error": "prediction_failed", "message": e.to_string() })
        ),
    }
}
