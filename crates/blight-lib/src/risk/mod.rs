//! Weather disease-risk pipeline
//!
//! Risk estimation always has an answer: when no weather model loads, or the
//! model fails at inference time, the closed-form heuristic takes over and the
//! result is tagged `source: "heuristic"`. Only an unparseable payload is
//! reported as a failure.

mod features;
mod heuristic;
mod interpret;

pub use features::FEATURE_ORDER;
pub use heuristic::heuristic_risk;
pub use interpret::{
    proxy_probability, risk_probability, HIGH_THRESHOLD, MEDIUM_THRESHOLD, NEGATIVE_PROXY,
    POSITIVE_PROXY, UNKNOWN_PROXY,
};

use crate::artifact::{
    weather_candidates, ArtifactDecoder, ModelArtifact, ModelInput, ModelLoader, OnnxDecoder,
};
use crate::config::RiskConfig;
use crate::models::{RiskAssessment, RiskLevel, RiskReport, WeatherReading};
use crate::pipeline::InferencePipeline;
use anyhow::Result;
use tracing::{debug, info, warn};

/// Number of weather features fed to the model
pub const NUM_FEATURES: usize = 5;

/// Tabular pipeline: fixed-order features, positive-class probability, band
#[derive(Debug, Default, Clone, Copy)]
pub struct RiskEstimator;

impl InferencePipeline for RiskEstimator {
    type Input = WeatherReading;
    type Output = (RiskLevel, f64);

    fn transform(&self, reading: &WeatherReading) -> Result<ModelInput> {
        reading.to_model_input()
    }

    fn interpret(
        &self,
        model: &dyn ModelArtifact,
        input: &ModelInput,
    ) -> Result<(RiskLevel, f64)> {
        let probability = risk_probability(model, input)?;
        Ok((RiskLevel::from_probability(probability), probability))
    }
}

/// Estimate risk for a raw stdin payload using the ONNX weather model
pub fn assess(config: &RiskConfig, payload: &str) -> RiskReport {
    assess_with(config, payload, OnnxDecoder::tabular())
}

/// Estimate risk, decoding weather artifacts with `decoder`
pub fn assess_with<D: ArtifactDecoder>(
    config: &RiskConfig,
    payload: &str,
    decoder: D,
) -> RiskReport {
    let reading = match WeatherReading::from_json(payload) {
        Ok(reading) => reading,
        Err(e) => {
            warn!(error = %e, "Rejecting weather payload");
            return RiskReport::invalid_input();
        }
    };

    let candidates = weather_candidates(&config.model_dir);
    let assessment = match ModelLoader::new(decoder).load(&candidates) {
        Some(loaded) => match RiskEstimator.run(loaded.model.as_ref(), &reading) {
            Ok((risk_level, probability)) => {
                debug!(
                    model = %loaded.candidate.path.display(),
                    format = loaded.candidate.format.tag(),
                    probability,
                    "Weather model scored reading"
                );
                RiskAssessment::from_model(risk_level, probability)
            }
            Err(e) => {
                warn!(
                    model = %loaded.candidate.path.display(),
                    error = %format!("{:#}", e),
                    "Weather model failed, using heuristic"
                );
                RiskAssessment::from_heuristic(heuristic_risk(&reading))
            }
        },
        None => {
            info!(
                model_dir = %config.model_dir.display(),
                "No weather model found, using heuristic"
            );
            RiskAssessment::from_heuristic(heuristic_risk(&reading))
        }
    };

    info!(
        risk_level = ?assessment.risk_level,
        source = ?assessment.source,
        "Risk assessed"
    );
    RiskReport::Assessment(assessment)
}
