//! Tabular model output to a risk probability and band

use super::features::numeric;
use crate::artifact::{ModelArtifact, ModelInput};
use crate::models::RiskLevel;
use anyhow::{Context, Result};
use serde_json::Value;

/// Probability at or above which risk is High
pub const HIGH_THRESHOLD: f64 = 0.7;

/// Probability at or above which risk is Medium
pub const MEDIUM_THRESHOLD: f64 = 0.5;

/// Proxy probability for a hard positive prediction
pub const POSITIVE_PROXY: f64 = 0.7;

/// Proxy probability for a hard negative prediction
pub const NEGATIVE_PROXY: f64 = 0.3;

/// Proxy probability for an uninterpretable prediction
pub const UNKNOWN_PROXY: f64 = 0.5;

impl RiskLevel {
    /// Step function over a probability; NaN maps to Medium
    pub fn from_probability(p: f64) -> Self {
        if p.is_nan() {
            RiskLevel::Medium
        } else if p >= HIGH_THRESHOLD {
            RiskLevel::High
        } else if p >= MEDIUM_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Lenient variant for loosely typed values; anything unreadable is Medium
    pub fn from_value(value: &Value) -> Self {
        let p = match value {
            Value::Array(items) => items.first().and_then(numeric),
            other => numeric(other),
        };
        p.map(Self::from_probability).unwrap_or(RiskLevel::Medium)
    }
}

/// Probability of the positive class from whatever the model exposes
pub fn risk_probability(model: &dyn ModelArtifact, input: &ModelInput) -> Result<f64> {
    if model.has_probability_output() {
        let probabilities = model.predict_probability(input)?;
        let positive = probabilities
            .last()
            .context("Model returned no class probabilities")?;
        return Ok(widen(*positive));
    }

    let labels = model.predict(input)?;
    let label = labels.first().context("Model returned no prediction")?;
    Ok(proxy_probability(widen(*label)))
}

/// f32 to f64 through the shortest decimal form, so `0.7f32` stays `0.7`
fn widen(value: f32) -> f64 {
    value.to_string().parse().unwrap_or(value as f64)
}

/// Fixed probability standing in for a hard class label
pub fn proxy_probability(label: f64) -> f64 {
    if !label.is_finite() {
        UNKNOWN_PROXY
    } else if label.trunc() == 1.0 {
        POSITIVE_PROXY
    } else {
        NEGATIVE_PROXY
    }
}
