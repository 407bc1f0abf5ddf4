//! Deployment configuration.
//!
//! All settings have built-in defaults, so the service runs without a
//! configuration file. A TOML file can override any subset:
//!
//! ```toml
//! model_path = "models/crop_model.json"
//! report_language = "Marathi"
//!
//! [environment]
//! rainfall = 950.0
//!
//! [generative]
//! model = "gemini-2.5-flash"
//! fallback_model = "gemini-2.0-flash"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use genai_client::{GeminiClient, GeminiConfig, TextGenerator, UnconfiguredGenerator};
use serde::{Deserialize, Serialize};
use soil_data::{EnvironmentalDefaults, SourceLinks};
use tracing::{info, warn};

/// Top-level configuration of the advisory service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Classifier artifact; a missing file means fallback mode
    pub model_path: PathBuf,
    /// Language the advisory narrative is requested in
    pub report_language: String,
    pub environment: EnvironmentalDefaults,
    pub sources: SourceLinks,
    pub generative: GenerativeConfig,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("crop_model.json"),
            report_language: pipeline::DEFAULT_LANGUAGE.to_string(),
            environment: EnvironmentalDefaults::default(),
            sources: SourceLinks::default(),
            generative: GenerativeConfig::default(),
        }
    }
}

impl AdvisorConfig {
    /// Read a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AdvisorConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Read `path` if given, otherwise use the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

/// Generative text provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerativeConfig {
    pub endpoint: String,
    pub model: String,
    /// Retried once when the primary model fails; unset means no retry
    pub fallback_model: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            endpoint: genai_client::DEFAULT_ENDPOINT.to_string(),
            model: genai_client::DEFAULT_MODEL.to_string(),
            fallback_model: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

impl GenerativeConfig {
    /// API key from the configured environment variable, if set and non-empty
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Build the text generator using the key from the environment.
    pub fn build_generator(&self) -> Result<Arc<dyn TextGenerator>> {
        self.build_generator_with_key(self.api_key())
    }

    /// Build the text generator for an explicit key.
    ///
    /// Without a key the generator always fails, so every report is served
    /// with the degraded narrative.
    pub fn build_generator_with_key(&self, api_key: Option<String>) -> Result<Arc<dyn TextGenerator>> {
        let Some(api_key) = api_key else {
            warn!(
                "{} is not set; advisory narratives will be unavailable",
                self.api_key_env
            );
            return Ok(Arc::new(UnconfiguredGenerator::new(format!(
                "{} is not set",
                self.api_key_env
            ))));
        };

        let client = GeminiClient::new(GeminiConfig {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            fallback_model: self.fallback_model.clone(),
            api_key,
            timeout: Duration::from_secs(self.timeout_secs),
        })
        .context("Failed to build Gemini client")?;

        Ok(Arc::new(client))
    }
}
