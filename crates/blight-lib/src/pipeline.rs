//! Shared shape of both inference pipelines
//!
//! load artifact -> transform input -> invoke model -> interpret output -> map decision

use crate::artifact::{ModelArtifact, ModelInput};
use anyhow::Result;

/// A pipeline specialised for one kind of input and result
pub trait InferencePipeline {
    type Input: ?Sized;
    type Output;

    /// Convert the raw input into the fixed-shape batch the model expects
    fn transform(&self, input: &Self::Input) -> Result<ModelInput>;

    /// Invoke the model and turn its output into the final result
    fn interpret(&self, model: &dyn ModelArtifact, input: &ModelInput) -> Result<Self::Output>;

    /// Transform, invoke and interpret in one pass
    fn run(&self, model: &dyn ModelArtifact, input: &Self::Input) -> Result<Self::Output> {
        let batch = self.transform(input)?;
        self.interpret(model, &batch)
    }
}
