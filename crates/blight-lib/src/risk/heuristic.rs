//! Closed-form risk rule used when no model is usable

use crate::models::{RiskLevel, WeatherReading};

/// Risk band straight from the weather values
pub fn heuristic_risk(reading: &WeatherReading) -> RiskLevel {
    let WeatherReading {
        temperature: t,
        humidity: h,
        rain,
        ..
    } = *reading;

    if (h > 70.0 && (15.0..=30.0).contains(&t)) || rain > 0.0 {
        RiskLevel::High
    } else if (h > 60.0 && h <= 70.0) || (10.0..15.0).contains(&t) || (t > 30.0 && t <= 35.0) {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}
