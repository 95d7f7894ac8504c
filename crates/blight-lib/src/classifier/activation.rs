//! Raw classifier output to probabilities
//!
//! `Auto` is best-effort: bounded outputs pass through untouched, so logits
//! that happen to fall inside [0, 1] are indistinguishable from probabilities.

/// Activation requested through configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activation {
    Softmax,
    Sigmoid,
    #[default]
    Auto,
}

impl Activation {
    pub fn from_setting(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "softmax" => Some(Activation::Softmax),
            "sigmoid" => Some(Activation::Sigmoid),
            "auto" => Some(Activation::Auto),
            _ => None,
        }
    }
}

/// What was actually done to the raw output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Softmax,
    Sigmoid,
    /// Bounded and summing to roughly one
    Probabilities,
    /// Bounded but not normalized; independent per-class scores
    MultiLabel,
}

impl Applied {
    pub fn tag(&self) -> &'static str {
        match self {
            Applied::Softmax => "softmax",
            Applied::Sigmoid => "sigmoid",
            Applied::Probabilities => "probabilities",
            Applied::MultiLabel => "multi_label",
        }
    }
}

/// Probabilities plus the branch that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub probabilities: Vec<f32>,
    pub applied: Applied,
}

/// Sum range accepted as an already-normalized distribution
const NORMALIZED_SUM: std::ops::RangeInclusive<f32> = 0.9..=1.1;

pub fn interpret(raw: &[f32], mode: Activation) -> Interpretation {
    match mode {
        Activation::Softmax => Interpretation {
            probabilities: softmax(raw),
            applied: Applied::Softmax,
        },
        Activation::Sigmoid => Interpretation {
            probabilities: sigmoid(raw),
            applied: Applied::Sigmoid,
        },
        Activation::Auto => {
            if raw.iter().all(|v| (0.0..=1.0).contains(v)) {
                let sum: f32 = raw.iter().sum();
                let applied = if NORMALIZED_SUM.contains(&sum) {
                    Applied::Probabilities
                } else {
                    Applied::MultiLabel
                };
                Interpretation {
                    probabilities: raw.to_vec(),
                    applied,
                }
            } else {
                Interpretation {
                    probabilities: softmax(raw),
                    applied: Applied::Softmax,
                }
            }
        }
    }
}

/// Numerically stable softmax; uniform when the exponent sum degenerates
pub fn softmax(values: &[f32]) -> Vec<f32> {
    if values.is_empty() {
        return Vec::new();
    }
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = values.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();

    if sum > 0.0 && sum.is_finite() {
        exps.into_iter().map(|e| e / sum).collect()
    } else {
        vec![1.0 / values.len() as f32; values.len()]
    }
}

pub fn sigmoid(values: &[f32]) -> Vec<f32> {
    values.iter().map(|v| 1.0 / (1.0 + (-v).exp())).collect()
}
