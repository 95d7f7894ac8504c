//! Artifact location: pure path/format resolution, no I/O

use crate::error::AdapterError;
use std::path::{Path, PathBuf};

/// Directly serialized weather model, next to the adapter
pub const WEATHER_MODEL_FILE: &str = "weather_model.onnx";

/// Container file embedding the weather model, relative to the model dir
pub const WEATHER_CONTAINER_FILE: &str = "models/random_forest_model.json";

/// Container field holding the base64-encoded model bytes
pub const EMBEDDED_MODEL_FIELD: &str = "model_onnx";

/// How the bytes of a candidate are laid out on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// The file is the serialized model
    Direct,
    /// A JSON container whose named field holds the base64 model bytes
    EmbeddedBlob { field: String },
}

impl ArtifactFormat {
    pub fn tag(&self) -> &'static str {
        match self {
            ArtifactFormat::Direct => "direct",
            ArtifactFormat::EmbeddedBlob { .. } => "embedded_blob",
        }
    }
}

/// One place a model might be found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCandidate {
    pub path: PathBuf,
    pub format: ArtifactFormat,
}

impl ArtifactCandidate {
    pub fn direct(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: ArtifactFormat::Direct,
        }
    }

    pub fn embedded(path: impl Into<PathBuf>, field: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            format: ArtifactFormat::EmbeddedBlob {
                field: field.into(),
            },
        }
    }
}

/// The single classifier candidate; a CLI override wins over configuration
pub fn classifier_candidates(
    configured: Option<&Path>,
    override_path: Option<&Path>,
) -> Result<Vec<ArtifactCandidate>, AdapterError> {
    match override_path.or(configured) {
        Some(path) => Ok(vec![ArtifactCandidate::direct(path)]),
        None => Err(AdapterError::ModelNotFound(
            "provide a model path argument or TOMATO_MODEL_PATH".to_string(),
        )),
    }
}

/// Weather model candidates in priority order
pub fn weather_candidates(model_dir: &Path) -> Vec<ArtifactCandidate> {
    vec![
        ArtifactCandidate::direct(model_dir.join(WEATHER_MODEL_FILE)),
        ArtifactCandidate::embedded(model_dir.join(WEATHER_CONTAINER_FILE), EMBEDDED_MODEL_FIELD),
    ]
}
