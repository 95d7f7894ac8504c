//! Adapter configuration
//!
//! All `TOMATO_*` environment variables are read once at process start into
//! [`Settings`], then validated into the per-pipeline structs
//! [`ClassifierConfig`] and [`RiskConfig`] which are passed explicitly to the
//! components that need them.

use crate::classifier::{Activation, Normalization};
use crate::error::AdapterError;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::warn;

/// Environment prefix shared by every recognised option
pub const ENV_PREFIX: &str = "TOMATO";

/// Default square input size for the classifier
pub const DEFAULT_IMAGE_SIZE: u32 = 224;

/// Raw, unvalidated option values keyed by their lowercased variable name
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    model_path: Option<String>,
    classes_path: Option<String>,
    class_indices_json: Option<String>,
    classes: Option<String>,
    image_size: Option<String>,
    use_keras_loader: Option<String>,
    auto_leaf_crop: Option<String>,
    center_crop: Option<String>,
    preprocess: Option<String>,
    activation: Option<String>,
    weather_model_dir: Option<String>,
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self, AdapterError> {
        Self::build(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Load settings from an explicit variable map (`TOMATO_*` keys)
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, AdapterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: config::Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::build(config::Environment::with_prefix(ENV_PREFIX).source(Some(map)))
    }

    fn build(source: config::Environment) -> Result<Self, AdapterError> {
        let settings = config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize::<Settings>()?;
        Ok(settings)
    }
}

/// Validated options for the image classification pipeline
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Classifier artifact location (`TOMATO_MODEL_PATH`)
    pub model_path: Option<PathBuf>,
    /// Label file (`TOMATO_CLASSES_PATH`, then `TOMATO_CLASS_INDICES_JSON`)
    pub classes_path: Option<PathBuf>,
    /// Inline comma-separated labels (`TOMATO_CLASSES`)
    pub inline_classes: Option<String>,
    /// Square input size fed to the model (default 224)
    pub image_size: u32,
    /// Decode + resize + divide-by-255 only (`TOMATO_USE_KERAS_LOADER`, default true)
    pub fast_loader: bool,
    /// Crop to the green-dominant region first (default false)
    pub auto_leaf_crop: bool,
    /// Crop to the largest centered square before resizing (default true)
    pub center_crop: bool,
    /// Pixel normalization strategy (default divide-by-255)
    pub normalization: Normalization,
    /// Activation applied to raw outputs (default auto)
    pub activation: Activation,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            classes_path: None,
            inline_classes: None,
            image_size: DEFAULT_IMAGE_SIZE,
            fast_loader: true,
            auto_leaf_crop: false,
            center_crop: true,
            normalization: Normalization::Rescale,
            activation: Activation::Auto,
        }
    }
}

impl ClassifierConfig {
    /// Load and validate from the process environment
    pub fn load() -> Result<Self, AdapterError> {
        Self::from_settings(&Settings::from_env()?)
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AdapterError> {
        let defaults = Self::default();

        let image_size = match non_empty(&settings.image_size) {
            Some(raw) => parse_image_size(raw)?,
            None => defaults.image_size,
        };

        let normalization = match non_empty(&settings.preprocess) {
            Some(raw) => Normalization::from_setting(raw).unwrap_or_else(|| {
                warn!(value = raw, "Unknown TOMATO_PREPROCESS, using divide-by-255");
                Normalization::Rescale
            }),
            None => defaults.normalization,
        };

        let activation = match non_empty(&settings.activation) {
            Some(raw) => Activation::from_setting(raw).unwrap_or_else(|| {
                warn!(value = raw, "Unknown TOMATO_ACTIVATION, using auto");
                Activation::Auto
            }),
            None => defaults.activation,
        };

        Ok(Self {
            model_path: non_empty(&settings.model_path).map(PathBuf::from),
            classes_path: non_empty(&settings.classes_path)
                .or_else(|| non_empty(&settings.class_indices_json))
                .map(PathBuf::from),
            inline_classes: non_empty(&settings.classes).map(str::to_string),
            image_size,
            fast_loader: flag(&settings.use_keras_loader, defaults.fast_loader),
            auto_leaf_crop: flag(&settings.auto_leaf_crop, defaults.auto_leaf_crop),
            center_crop: flag(&settings.center_crop, defaults.center_crop),
            normalization,
            activation,
        })
    }
}

/// Validated options for the weather risk pipeline
#[derive(Debug, Clone)]
pub struct RiskConfig {
    /// Directory holding `weather_model.onnx` and `models/`
    pub model_dir: PathBuf,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
        }
    }
}

impl RiskConfig {
    /// Load from the process environment; never fails
    pub fn load() -> Self {
        match Settings::from_env() {
            Ok(settings) => Self::from_settings(&settings),
            Err(e) => {
                warn!(error = %e, "Failed to read environment, using defaults");
                Self::default()
            }
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            model_dir: non_empty(&settings.weather_model_dir)
                .map(PathBuf::from)
                .unwrap_or_else(default_model_dir),
        }
    }
}

/// Directory of the running executable, falling back to the working directory
fn default_model_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// `1`, `true` and `yes` enable a flag; any other set value disables it
fn flag(value: &Option<String>, default: bool) -> bool {
    match non_empty(value) {
        Some(raw) => matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        None => default,
    }
}

fn parse_image_size(raw: &str) -> Result<u32, AdapterError> {
    match raw.parse::<u32>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(AdapterError::InvalidConfig(format!(
            "TOMATO_IMAGE_SIZE must be a positive integer, got {:?}",
            raw
        ))),
    }
}
