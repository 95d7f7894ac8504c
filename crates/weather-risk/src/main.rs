//! Weather-based late blight risk
//!
//! Reads one JSON object of weather measurements from stdin and prints the
//! risk assessment on stdout. Only a malformed payload is reported as a
//! failure; a missing or broken model falls back to the heuristic.

use blight_lib::{assess, init_tracing, RiskConfig, RiskReport};
use clap::Parser;
use std::io::Read;
use tracing::warn;

/// Estimate late blight risk from weather measurements
#[derive(Parser)]
#[command(name = "weather-risk")]
#[command(author, version, long_about = None)]
#[command(about = "Reads {temperature, humidity, rain, wind_speed, cloudiness} as JSON on stdin")]
struct Cli {}

fn main() {
    init_tracing();
    let _cli = Cli::parse();

    let mut payload = String::new();
    let report = match std::io::stdin().read_to_string(&mut payload) {
        Ok(_) => assess(&RiskConfig::load(), &payload),
        Err(e) => {
            warn!(error = %e, "Failed to read stdin");
            RiskReport::invalid_input()
        }
    };

    match serde_json::to_string(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            warn!(error = %e, "Failed to serialize report");
            println!(r#"{{"success":false,"error":"invalid_input"}}"#);
        }
    }
}
