//! Probabilities to a labeled, ranked prediction

use super::labels::ClassLabelSet;
use crate::models::{LabeledProbability, PredictionResult};

/// Number of entries in the long ranking
pub const TOP_K: usize = 5;

/// Number of entries in the short ranking
pub const TOP_SHORT: usize = 3;

/// Index of the first maximum; `None` for an empty vector
pub fn argmax(probabilities: &[f32]) -> Option<usize> {
    if probabilities.is_empty() {
        return None;
    }
    let mut best = 0;
    let mut best_p = f32::NEG_INFINITY;
    for (i, &p) in probabilities.iter().enumerate() {
        // NaN never compares greater, so it is skipped
        if p > best_p {
            best = i;
            best_p = p;
        }
    }
    Some(best)
}

/// Indices ordered by descending probability; ties keep the lower index first
pub fn rank(probabilities: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    order.sort_by(|&a, &b| {
        let (pa, pb) = (probabilities[a], probabilities[b]);
        match (pa.is_nan(), pb.is_nan()) {
            (true, true) => std::cmp::Ordering::Equal,
            (true, false) => std::cmp::Ordering::Greater,
            (false, true) => std::cmp::Ordering::Less,
            _ => pb.total_cmp(&pa),
        }
    });
    order
}

/// Build the user-facing result; `None` when there is nothing to rank
pub fn decide(probabilities: &[f32], labels: &ClassLabelSet) -> Option<PredictionResult> {
    let best = argmax(probabilities)?;

    let top5: Vec<LabeledProbability> = rank(probabilities)
        .into_iter()
        .take(TOP_K)
        .map(|i| LabeledProbability {
            label: labels.label(i),
            prob: clamp_unit(probabilities[i]),
        })
        .collect();
    let top3 = top5.iter().take(TOP_SHORT).cloned().collect();

    Some(PredictionResult {
        predicted_class: labels.label(best),
        confidence: clamp_unit(probabilities[best]),
        top3,
        top5,
    })
}

fn clamp_unit(p: f32) -> f32 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}
