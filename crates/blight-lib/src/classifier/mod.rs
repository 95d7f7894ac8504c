//! Leaf disease classification pipeline
//!
//! There is no heuristic substitute for image classification: a missing
//! classifier is fatal, and any failure while predicting is reported as
//! `prediction_failed`.

mod activation;
mod labels;
mod preprocess;
mod ranking;

pub use activation::{interpret, sigmoid, softmax, Activation, Applied, Interpretation};
pub use labels::{ClassLabelSet, DEFAULT_CLASSES};
pub use preprocess::{center_square, leaf_crop, ImagePreprocessor, Normalization, Unchanged};
pub use ranking::{argmax, decide, rank, TOP_K, TOP_SHORT};

use crate::artifact::{
    classifier_candidates, ArtifactDecoder, ModelArtifact, ModelInput, ModelLoader, OnnxDecoder,
};
use crate::config::ClassifierConfig;
use crate::error::AdapterError;
use crate::models::PredictionResult;
use crate::pipeline::InferencePipeline;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info, warn};

/// Image pipeline: preprocess, activate, rank
pub struct ImageClassifier {
    preprocessor: ImagePreprocessor,
    labels: ClassLabelSet,
    activation: Activation,
}

impl ImageClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        let labels = ClassLabelSet::resolve(
            config.classes_path.as_deref(),
            config.inline_classes.as_deref(),
        );
        Self::with_labels(config, labels)
    }

    pub fn with_labels(config: &ClassifierConfig, labels: ClassLabelSet) -> Self {
        Self {
            preprocessor: ImagePreprocessor::new(config),
            labels,
            activation: config.activation,
        }
    }

    pub fn labels(&self) -> &ClassLabelSet {
        &self.labels
    }
}

impl InferencePipeline for ImageClassifier {
    type Input = Path;
    type Output = PredictionResult;

    fn transform(&self, image_path: &Path) -> Result<ModelInput> {
        self.preprocessor.load(image_path)
    }

    fn interpret(&self, model: &dyn ModelArtifact, input: &ModelInput) -> Result<PredictionResult> {
        let raw = model.predict(input)?;
        if raw.is_empty() {
            anyhow::bail!("Model returned an empty output");
        }
        if raw.len() != self.labels.len() {
            warn!(
                outputs = raw.len(),
                labels = self.labels.len(),
                "Model output count differs from class labels"
            );
        }

        let interpretation = activation::interpret(&raw, self.activation);
        debug!(
            classes = raw.len(),
            applied = interpretation.applied.tag(),
            "Classifier output interpreted"
        );

        ranking::decide(&interpretation.probabilities, &self.labels)
            .context("No class probabilities to rank")
    }
}

/// Classify one image with the ONNX classifier named by configuration or override
pub fn classify(
    config: &ClassifierConfig,
    image_path: Option<&Path>,
    model_override: Option<&Path>,
) -> Result<PredictionResult, AdapterError> {
    classify_with(
        config,
        image_path,
        model_override,
        OnnxDecoder::image(config.image_size),
    )
}

/// Classify one image, decoding the artifact with `decoder`
pub fn classify_with<D: ArtifactDecoder>(
    config: &ClassifierConfig,
    image_path: Option<&Path>,
    model_override: Option<&Path>,
    decoder: D,
) -> Result<PredictionResult, AdapterError> {
    let image_path = image_path.ok_or(AdapterError::MissingImagePath)?;

    let candidates = classifier_candidates(config.model_path.as_deref(), model_override)?;
    let loaded = ModelLoader::new(decoder).load(&candidates).ok_or_else(|| {
        let tried: Vec<String> = candidates
            .iter()
            .map(|c| c.path.display().to_string())
            .collect();
        AdapterError::ModelNotFound(tried.join(", "))
    })?;

    let classifier = ImageClassifier::new(config);
    let prediction = classifier
        .run(loaded.model.as_ref(), image_path)
        .map_err(|e| AdapterError::PredictionFailed(format!("{:#}", e)))?;

    info!(
        predicted_class = %prediction.predicted_class,
        confidence = prediction.confidence,
        model = %loaded.candidate.path.display(),
        "Image classified"
    );
    Ok(prediction)
}
