//! Core data models shared by both adapters

use crate::error::AdapterError;
use serde::{Deserialize, Serialize};

/// One ranked class with its probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledProbability {
    pub label: String,
    pub prob: f32,
}

/// Classification output for a single image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_class: String,
    pub confidence: f32,
    pub top3: Vec<LabeledProbability>,
    pub top5: Vec<LabeledProbability>,
}

/// Weather measurements fed to the risk model
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeatherReading {
    pub temperature: f64,
    pub humidity: f64,
    pub rain: f64,
    pub wind_speed: f64,
    pub cloudiness: f64,
}

impl Default for WeatherReading {
    fn default() -> Self {
        Self {
            temperature: 20.0,
            humidity: 60.0,
            rain: 0.0,
            wind_speed: 2.0,
            cloudiness: 20.0,
        }
    }
}

/// Qualitative disease-risk band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Which strategy produced a risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskSource {
    Model,
    Heuristic,
}

/// Successful risk estimation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub success: bool,
    pub risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    pub source: RiskSource,
}

impl RiskAssessment {
    pub fn from_model(risk_level: RiskLevel, probability: f64) -> Self {
        Self {
            success: true,
            risk_level,
            probability: Some(probability),
            source: RiskSource::Model,
        }
    }

    pub fn from_heuristic(risk_level: RiskLevel) -> Self {
        Self {
            success: true,
            risk_level,
            probability: None,
            source: RiskSource::Heuristic,
        }
    }
}

/// Failure report printed in place of a result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&AdapterError> for ErrorReport {
    fn from(err: &AdapterError) -> Self {
        Self {
            error: err.kind().to_string(),
            message: err.message(),
        }
    }
}

/// Stdout document of the image adapter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClassifyReport {
    Prediction(PredictionResult),
    Error(ErrorReport),
}

impl From<Result<PredictionResult, AdapterError>> for ClassifyReport {
    fn from(result: Result<PredictionResult, AdapterError>) -> Self {
        match result {
            Ok(prediction) => ClassifyReport::Prediction(prediction),
            Err(e) => ClassifyReport::Error(ErrorReport::from(&e)),
        }
    }
}

/// Stdout document of the weather adapter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RiskReport {
    Assessment(RiskAssessment),
    Rejected { success: bool, error: String },
}

impl RiskReport {
    /// Report for a payload that could not be parsed
    pub fn invalid_input() -> Self {
        RiskReport::Rejected {
            success: false,
            error: AdapterError::InvalidInput(String::new()).kind().to_string(),
        }
    }
}
