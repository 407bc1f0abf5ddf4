//! Simple test harness for the advisory orchestrator.
//!
//! Runs one analysis request end to end and prints the JSON response.
//! Set `CROP_ADVISOR_CONFIG` to a TOML file to override the defaults.

use std::path::PathBuf;

use anyhow::Result;
use serde_json::json;
use tracing::info;

use server::{AdvisorConfig, AdvisoryOrchestrator};
use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset or invalid
const DEFAULT_LOG_FILTER: &str =
    "info,server=debug,pipeline=debug,crop_model=debug,genai_client=debug";

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt().with_env_filter(log_filter()).init();

    info!("Starting crop advisor test harness");

    let config_path = std::env::var_os("CROP_ADVISOR_CONFIG").map(PathBuf::from);
    let config = AdvisorConfig::load_or_default(config_path.as_deref())?;

    info!("Loading classifier from {}", config.model_path.display());
    let orchestrator = AdvisoryOrchestrator::from_config(&config)?;

    let request = json!({
        "n": 90,
        "p": 40,
        "k": 40,
        "ph": 6.5,
        "location": "Nashik"
    });
    info!("Analyzing sample request: {}", request);

    let response = orchestrator.analyze_response(&request).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_filter_parses() {
        let filter = EnvFilter::try_new(DEFAULT_LOG_FILTER).unwrap();
        assert!(filter.to_string().contains("server=debug"));
    }
}
