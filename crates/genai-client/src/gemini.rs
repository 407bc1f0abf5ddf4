//! Google Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{GenerationError, TextGenerator};

/// Public REST endpoint of the Gemini API
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when the deployment does not choose one
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Settings for [`GeminiClient`]
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub endpoint: String,
    pub model: String,
    /// Model tried once more after the primary call fails
    pub fallback_model: Option<String>,
    pub api_key: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            fallback_model: None,
            api_key: api_key.into(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Client for the Gemini text generation API.
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
    fallback_model: Option<String>,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        info!(
            "Gemini client ready (model: {}, fallback: {})",
            config.model,
            config.fallback_model.as_deref().unwrap_or("none")
        );

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model,
            fallback_model: config.fallback_model,
            api_key: config.api_key,
        })
    }

    fn url_for(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, model)
    }

    /// Single call against one model; no retry.
    async fn generate_with(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        debug!("Requesting generation from {} ({} prompt chars)", model, prompt.len());

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let resp = self
            .client
            .post(self.url_for(model))
            .header("x-goog-api-key", self.api_key.trim())
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            error!("Gemini returned {}: {}", status, body);
            return Err(GenerationError::Status { status, body });
        }

        let parsed: GenerateContentResponse =
            resp.json().await.map_err(GenerationError::Decode)?;
        extract_text(parsed)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        match self.generate_with(&self.model, prompt).await {
            Ok(text) => Ok(text),
            Err(primary) => match &self.fallback_model {
                Some(fallback) => {
                    warn!(
                        "Generation with {} failed ({}); retrying once with {}",
                        self.model, primary, fallback
                    );
                    self.generate_with(fallback, prompt).await.map_err(|second| {
                        GenerationError::FallbackFailed {
                            primary_model: self.model.clone(),
                            primary: Box::new(primary),
                            fallback_model: fallback.clone(),
                            fallback: Box::new(second),
                        }
                    })
                }
                None => Err(primary),
            },
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<String, GenerationError> {
    let block_reason = response.prompt_feedback.and_then(|f| f.block_reason);

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(GenerationError::EmptyResponse {
            reason: block_reason,
        });
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse {
            reason: candidate.finish_reason.or(block_reason),
        });
    }
    Ok(text)
}
