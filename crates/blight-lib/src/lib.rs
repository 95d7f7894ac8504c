//! Tomato blight inference adapters
//!
//! This crate provides the core functionality for:
//! - Leaf image classification with a pre-trained CNN
//! - Weather-driven disease risk with a tabular model and heuristic fallback
//! - Model artifact discovery and loading
//! - Adapter configuration, error reporting and logging

pub mod artifact;
pub mod classifier;
pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod pipeline;
pub mod risk;

pub use classifier::{classify, ImageClassifier};
pub use config::{ClassifierConfig, RiskConfig};
pub use error::AdapterError;
pub use models::*;
pub use observability::init_tracing;
pub use pipeline::InferencePipeline;
pub use risk::{assess, RiskEstimator};
