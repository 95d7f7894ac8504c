//! ONNX inference using tract
//!
//! Classifier and weather models are both exported to ONNX and executed with
//! tract-onnx; no native runtime has to be present on the host.

use super::{ArtifactDecoder, ModelArtifact, ModelInput};
use anyhow::{Context, Result};
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::debug;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Output slot carrying class probabilities on tabular classifiers
const PROBABILITY_OUTPUT: usize = 1;

/// ONNX model pinned to a fixed input shape
pub struct OnnxModel {
    model: TractModel,
    input_shape: Vec<usize>,
    output_count: usize,
}

impl OnnxModel {
    /// Parse, type and optimize an ONNX graph from bytes
    pub fn from_bytes(model_bytes: &[u8], input_shape: &[usize]) -> Result<Self> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact(input_shape.to_vec()).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;

        let output_count = model.model().outputs.len();
        debug!(?input_shape, output_count, "ONNX model ready");

        Ok(Self {
            model,
            input_shape: input_shape.to_vec(),
            output_count,
        })
    }

    fn run_output(&self, input: &ModelInput, slot: usize) -> Result<Vec<f32>> {
        if input.shape != self.input_shape {
            anyhow::bail!(
                "Input shape {:?} does not match model shape {:?}",
                input.shape,
                self.input_shape
            );
        }

        let start = Instant::now();
        let tensor = Tensor::from_shape(&input.shape, &input.values)?;
        let outputs = self.model.run(tvec!(tensor.into()))?;
        let output = outputs.get(slot).context("Missing model output")?;

        let values = output
            .cast_to::<f32>()
            .context("Model output is not numeric")?
            .as_slice::<f32>()?
            .to_vec();

        debug!(elapsed_us = start.elapsed().as_micros(), slot, "Inference completed");
        Ok(values)
    }
}

impl ModelArtifact for OnnxModel {
    fn predict(&self, input: &ModelInput) -> Result<Vec<f32>> {
        self.run_output(input, 0)
    }

    fn has_probability_output(&self) -> bool {
        self.output_count > PROBABILITY_OUTPUT
    }

    fn predict_probability(&self, input: &ModelInput) -> Result<Vec<f32>> {
        if !self.has_probability_output() {
            anyhow::bail!("Model has no probability output");
        }
        self.run_output(input, PROBABILITY_OUTPUT)
    }
}

/// Decodes ONNX bytes for a given input shape
#[derive(Debug, Clone)]
pub struct OnnxDecoder {
    input_shape: Vec<usize>,
}

impl OnnxDecoder {
    /// NHWC image classifier taking a `size` x `size` RGB batch of one
    pub fn image(size: u32) -> Self {
        Self {
            input_shape: vec![1, size as usize, size as usize, 3],
        }
    }

    /// Tabular model over the five weather features
    pub fn tabular() -> Self {
        Self {
            input_shape: vec![1, crate::risk::NUM_FEATURES],
        }
    }

    pub fn input_shape(&self) -> &[usize] {
        &self.input_shape
    }
}

impl ArtifactDecoder for OnnxDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Box<dyn ModelArtifact>> {
        Ok(Box::new(OnnxModel::from_bytes(bytes, &self.input_shape)?))
    }
}
