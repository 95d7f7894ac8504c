//! Weather payload parsing and feature assembly
//!
//! The model was trained on raw measurements, so values are passed through in
//! a fixed order without normalization.

use super::NUM_FEATURES;
use crate::artifact::ModelInput;
use crate::error::AdapterError;
use crate::models::WeatherReading;
use anyhow::Result;
use serde_json::Value;

/// Field names in model input order
pub const FEATURE_ORDER: [&str; NUM_FEATURES] =
    ["temperature", "humidity", "rain", "wind_speed", "cloudiness"];

impl WeatherReading {
    /// Parse a JSON object; absent or null fields take their defaults
    pub fn from_json(payload: &str) -> Result<Self, AdapterError> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| AdapterError::InvalidInput(e.to_string()))?;
        let object = value
            .as_object()
            .ok_or_else(|| AdapterError::InvalidInput("payload is not a JSON object".into()))?;

        let defaults = WeatherReading::default();
        let field = |name: &str, default: f64| -> Result<f64, AdapterError> {
            match object.get(name) {
                None | Some(Value::Null) => Ok(default),
                Some(v) => numeric(v).ok_or_else(|| {
                    AdapterError::InvalidInput(format!("{} is not a number: {}", name, v))
                }),
            }
        };

        Ok(WeatherReading {
            temperature: field("temperature", defaults.temperature)?,
            humidity: field("humidity", defaults.humidity)?,
            rain: field("rain", defaults.rain)?,
            wind_speed: field("wind_speed", defaults.wind_speed)?,
            cloudiness: field("cloudiness", defaults.cloudiness)?,
        })
    }

    /// Values in [`FEATURE_ORDER`]
    pub fn to_features(&self) -> [f64; NUM_FEATURES] {
        [
            self.temperature,
            self.humidity,
            self.rain,
            self.wind_speed,
            self.cloudiness,
        ]
    }

    /// Single-row batch for the tabular model
    pub fn to_model_input(&self) -> Result<ModelInput> {
        let values = self.to_features().iter().map(|&v| v as f32).collect();
        ModelInput::new(vec![1, NUM_FEATURES], values)
    }
}

/// JSON number or numeric string
pub(crate) fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_fields_present() {
        let payload = r#"{
            "temperature": 22.5,
            "humidity": 81,
            "rain": 1.2,
            "wind_speed": 3,
            "cloudiness": 75
        }"#;
        let reading = WeatherReading::from_json(payload).unwrap();
        assert_eq!(reading.to_features(), [22.5, 81.0, 1.2, 3.0, 75.0]);
    }

    #[test]
    fn test_each_field_defaults_independently() {
        let reading = WeatherReading::from_json(r#"{"humidity": 90}"#).unwrap();
        assert_eq!(reading.humidity, 90.0);
        assert_eq!(reading.temperature, 20.0);
        assert_eq!(reading.rain, 0.0);
        assert_eq!(reading.wind_speed, 2.0);
        assert_eq!(reading.cloudiness, 20.0);

        let reading = WeatherReading::from_json("{}").unwrap();
        assert_eq!(reading, WeatherReading::default());
    }

    #[test]
    fn test_null_and_numeric_strings() {
        let reading =
            WeatherReading::from_json(r#"{"temperature": null, "rain": "0.4"}"#).unwrap();
        assert_eq!(reading.temperature, 20.0);
        assert_eq!(reading.rain, 0.4);
    }

    #[test]
    fn test_malformed_payloads() {
        let payloads = [
            "not json",
            "",
            "[1, 2]",
            "42",
            r#"{"humidity": "wet"}"#,
            r#"{"rain": [1]}"#,
        ];
        for payload in payloads {
            let err = WeatherReading::from_json(payload).unwrap_err();
            assert_eq!(err.kind(), "invalid_input", "payload {:?}", payload);
        }
    }

    #[test]
    fn test_model_input_order() {
        let reading = WeatherReading {
            temperature: 1.0,
            humidity: 2.0,
            rain: 3.0,
            wind_speed: 4.0,
            cloudiness: 5.0,
        };
        let input = reading.to_model_input().unwrap();
        assert_eq!(input.shape, vec![1, 5]);
        assert_eq!(input.values, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }
}
