//! Generative text client for the advisory narrative.
//!
//! This crate provides:
//! - The [`TextGenerator`] trait the report composer depends on
//! - [`GeminiClient`], a `generateContent` REST client built on reqwest
//! - [`UnconfiguredGenerator`], used when no API key is available so the
//!   service still starts and serves degraded narratives
//!
//! Timeouts belong to the client (see [`GeminiConfig::timeout`]); callers
//! decide what to do with a [`GenerationError`].

use async_trait::async_trait;
use thiserror::Error;

pub mod gemini;

pub use gemini::{GeminiClient, GeminiConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};

/// Errors that can occur when asking the provider for text
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Generative text provider not configured: {0}")]
    NotConfigured(String),

    #[error("Failed to reach generative text provider: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode provider response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("Provider returned no text{}", reason_suffix(.reason))]
    EmptyResponse { reason: Option<String> },

    /// Both the primary and the fallback model failed
    #[error("{primary_model} failed: {primary}; fallback {fallback_model} failed: {fallback}")]
    FallbackFailed {
        primary_model: String,
        primary: Box<GenerationError>,
        fallback_model: String,
        fallback: Box<GenerationError>,
    },
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(" ({})", r))
        .unwrap_or_default()
}

/// Turns a prompt into generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier requests are sent to
    fn model(&self) -> &str;

    /// Generate text for a single prompt.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Generator that always fails with [`GenerationError::NotConfigured`].
pub struct UnconfiguredGenerator {
    reason: String,
}

impl UnconfiguredGenerator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for UnconfiguredGenerator {
    fn model(&self) -> &str {
        "unconfigured"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::NotConfigured(self.reason.clone()))
    }
}
