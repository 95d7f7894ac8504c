//! Class label resolution
//!
//! Sources are tried in order: label file, inline list, built-in defaults.
//! Index order must match the order the classifier was trained with.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Labels used when nothing else is configured
pub const DEFAULT_CLASSES: [&str; 8] = [
    "healthy",
    "early_blight",
    "late_blight",
    "bacterial_spot",
    "mosaic_virus",
    "yellow_virus",
    "leaf_mold",
    "septoria_leaf_spot",
];

/// Ordered class names indexed by model output position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLabelSet {
    names: Vec<String>,
}

impl Default for ClassLabelSet {
    fn default() -> Self {
        Self::new(DEFAULT_CLASSES.iter().map(|s| s.to_string()).collect())
    }
}

impl ClassLabelSet {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Resolve from a label file, then an inline comma list, then defaults
    pub fn resolve(file: Option<&Path>, inline: Option<&str>) -> Self {
        if let Some(labels) = file.and_then(from_file).map(Self::new) {
            if !labels.is_empty() {
                debug!(count = labels.len(), "Class labels loaded from file");
                return labels;
            }
        }
        if let Some(labels) = inline.and_then(from_inline) {
            debug!(count = labels.len(), "Class labels loaded from TOMATO_CLASSES");
            return Self::new(labels);
        }
        debug!("Using default class labels");
        Self::default()
    }

    /// Label for an output index; indices past the set get `class_<i>`
    pub fn label(&self, index: usize) -> String {
        self.names
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("class_{}", index))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

fn from_file(path: &Path) -> Option<Vec<String>> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(serde_json::Value::Object(map)) => invert_indices(&map),
        Ok(serde_json::Value::Array(items)) => Some(items.iter().map(json_to_label).collect()),
        Ok(_) => None,
        Err(_) => Some(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        ),
    }
}

/// `{"name": index}` into names ordered by index
///
/// Keys are visited in file order, so when two names share an index the
/// later one wins.
fn invert_indices(map: &serde_json::Map<String, serde_json::Value>) -> Option<Vec<String>> {
    let mut by_index = BTreeMap::new();
    for (name, index) in map {
        by_index.insert(index_value(index)?, name.clone());
    }
    Some(by_index.into_values().collect())
}

fn index_value(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_to_label(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn from_inline(raw: &str) -> Option<Vec<String>> {
    let labels: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    (!labels.is_empty()).then_some(labels)
}
