//! Model artifacts: locating, loading and invoking pre-trained models
//!
//! The pipelines only see [`ModelArtifact`], a capability interface over an
//! opaque model. Concrete serialization formats are adapters behind
//! [`ArtifactDecoder`].

mod loader;
mod locator;
mod onnx;

#[cfg(test)]
pub(crate) mod test_graphs;

pub use loader::{LoadedArtifact, ModelLoader};
pub use locator::{
    classifier_candidates, weather_candidates, ArtifactCandidate, ArtifactFormat,
    EMBEDDED_MODEL_FIELD, WEATHER_CONTAINER_FILE, WEATHER_MODEL_FILE,
};
pub use onnx::{OnnxDecoder, OnnxModel};

use anyhow::Result;

/// A single-row batch of f32 values with its logical shape
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInput {
    pub shape: Vec<usize>,
    pub values: Vec<f32>,
}

impl ModelInput {
    pub fn new(shape: Vec<usize>, values: Vec<f32>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            anyhow::bail!(
                "Input has {} values but shape {:?} needs {}",
                values.len(),
                shape,
                expected
            );
        }
        Ok(Self { shape, values })
    }
}

/// Capability set of a loaded model
pub trait ModelArtifact {
    /// Run the model and return its primary output, flattened
    fn predict(&self, input: &ModelInput) -> Result<Vec<f32>>;

    /// Whether [`ModelArtifact::predict_probability`] is available
    fn has_probability_output(&self) -> bool {
        false
    }

    /// Run the model and return its class-probability output, flattened
    fn predict_probability(&self, _input: &ModelInput) -> Result<Vec<f32>> {
        anyhow::bail!("Model does not expose class probabilities")
    }
}

/// Turns raw artifact bytes into a usable model
pub trait ArtifactDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Box<dyn ModelArtifact>>;
}
