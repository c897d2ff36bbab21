//! Generative-text client.
//!
//! One POST per prompt: no retries, no streaming. The credential comes from
//! the server configuration only and is passed as the `key` query parameter.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AssistantConfig;

pub const SYSTEM_PROMPT: &str = "You are a helpful AI medicine assistant. Provide accurate, \
helpful information about medicines, drug interactions, side effects, and general health advice. \
Always recommend consulting healthcare professionals for specific medical advice. \
Keep responses concise but informative.";

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Gemini API key not configured on the server")]
    CredentialMissing,

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Message is empty")]
    EmptyPrompt,

    #[error("Invalid chat history: {0}")]
    InvalidTranscript(String),
}

/// The pluggable text backend behind the assistant.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn is_configured(&self) -> bool;
    async fn send_prompt(&self, prompt: &str) -> Result<String, AssistantError>;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content>,
    generation_config: &'a GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

fn build_request<'a>(prompt: &str, generation: &'a GenerationConfig) -> GenerateRequest<'a> {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![
                Part {
                    text: Some(SYSTEM_PROMPT.to_string()),
                },
                Part {
                    text: Some(prompt.to_string()),
                },
            ],
        }],
        generation_config: generation,
    }
}

/// `candidates[0].content.parts[0].text`, or `RequestFailed`.
fn extract_text(body: &str) -> Result<String, AssistantError> {
    let invalid = || AssistantError::RequestFailed("Invalid response format from Gemini API".into());
    let parsed: GenerateResponse = serde_json::from_str(body).map_err(|_| invalid())?;
    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(invalid)
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    generation: GenerationConfig,
}

impl GeminiClient {
    pub fn new(cfg: &AssistantConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            api_key: cfg.api_key.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            generation: GenerationConfig::default(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send_prompt(&self, prompt: &str) -> Result<String, AssistantError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(AssistantError::CredentialMissing)?;

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", key)])
            .json(&build_request(prompt, &self.generation))
            .send()
            .await
            // the URL carries the key
            .map_err(|e| AssistantError::RequestFailed(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), model = %self.model, "generateContent rejected");
            return Err(AssistantError::RequestFailed(format!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )
            .trim_end()
            .to_string()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AssistantError::RequestFailed(e.without_url().to_string()))?;
        let text = extract_text(&body)?;
        debug!(model = %self.model, chars = text.len(), "generateContent ok");
        Ok(text)
    }
}
