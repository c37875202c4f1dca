//! Google Gemini `generateContent` client.

use super::{LanguageModel, LlmFailure};
use crate::core::config::LlmConfig;
use crate::core::error::{FootbotError, Result};
use anyhow::anyhow;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Serialize, Debug)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize, Debug)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize, Debug)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize, Debug)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize, Debug, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// `candidates[0].content.parts[0].text`, if present and non-blank.
    fn first_text(self) -> Option<String> {
        let text = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text?;
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

#[derive(Debug)]
pub struct GeminiClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiClient {
    /// Builds a client from `[llm]`. Fails when no API key is configured.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                anyhow!(FootbotError::Config(
                    "llm.api_key (or GEMINI_API_KEY) is required to use Gemini".to_string()
                ))
            })?
            .to_string();

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| FootbotError::HttpClient { source })?;

        Ok(Self {
            http,
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// Builds a client only when the configuration says an LLM is available.
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>> {
        if config.is_available() {
            Self::new(config).map(Some)
        } else {
            debug!("No language model configured; replies will use templates");
            Ok(None)
        }
    }
}

impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> std::result::Result<String, LlmFailure> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmFailure::Timeout
                } else {
                    LlmFailure::Unavailable(format!("request failed: {}", e.without_url()))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("Gemini returned {}: {}", status, detail);
            return Err(LlmFailure::Unavailable(format!("status {}", status)));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmFailure::Unavailable(format!("unreadable response: {}", e)))?;
        parsed
            .first_text()
            .ok_or_else(|| LlmFailure::Unavailable("response contained no text".to_string()))
    }

    fn name(&self) -> &str {
        &self.model
    }
}
