//! Gemini provider implementation for Gemchat
//!
//! Talks to the Google Generative Language API's `generateContent` endpoint.
//! The API key travels in the `x-goog-api-key` header; the request body is
//! the `contents` array of role-tagged text parts, and the reply text is the
//! concatenation of the first candidate's parts.

use crate::config::GeminiConfig;
use crate::provider::{Provider, ProviderError, ProviderResult};
use crate::store::ChatMessage;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini API provider
///
/// Holds the HTTP client, the endpoint/model configuration, and the API key
/// read at startup. A missing key does not fail construction; every
/// `generate` call then returns `ProviderError::Disabled` so the chat loop
/// stays usable and the error is shown in-conversation.
///
/// # Examples
///
/// ```no_run
/// use gemchat::config::GeminiConfig;
/// use gemchat::provider::{GeminiProvider, Provider};
/// use gemchat::store::ChatMessage;
///
/// # async fn example() -> gemchat::error::Result<()> {
/// let config = GeminiConfig::default();
/// let provider = GeminiProvider::new(config, Some("api-key".to_string()))?;
/// let reply = provider.generate(&[ChatMessage::user("Hello!")]).await;
/// # Ok(())
/// # }
/// ```
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
    api_key: Option<String>,
}

/// Request body for generateContent
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

/// One role-tagged turn in the request/response
#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

/// A text fragment within a turn
#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// Response body from generateContent
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Error payload returned with non-success statuses
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider instance
    ///
    /// # Arguments
    ///
    /// * `config` - Gemini configuration containing model and API base URL
    /// * `api_key` - API key, or None when the environment carried no key
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: GeminiConfig, api_key: Option<String>) -> crate::error::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent("gemchat/0.1.0")
            .build()
            .map_err(|e| {
                crate::error::GemchatError::Config(format!("Failed to create HTTP client: {}", e))
            })?;

        if api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY not set; model calls will fail until configured");
        }

        tracing::info!(
            "Initialized Gemini provider: model={}, api_base={}",
            config.model,
            config.api_base
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Get the configured model name
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Whether a key was available at startup
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Convert stored messages to the Gemini wire format
    ///
    /// Stored `assistant` turns become `model` turns on the wire.
    fn convert_transcript(transcript: &[ChatMessage]) -> Vec<Content> {
        transcript
            .iter()
            .map(|m| Content {
                role: m.role.api_str().to_string(),
                parts: vec![Part {
                    text: m.content.clone(),
                }],
            })
            .collect()
    }

    /// Map a non-success HTTP status to a structured error kind
    fn classify_status(status: StatusCode, message: String) -> ProviderError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Auth(message),
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimit(message),
            _ => ProviderError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Pull the reply text out of a parsed response
    fn extract_text(response: GenerateResponse) -> ProviderResult<String> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Malformed("response contained no candidates".into()))?;

        let content = candidate
            .content
            .ok_or_else(|| ProviderError::Malformed("candidate contained no content".into()))?;

        let text: String = content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(ProviderError::Malformed(
                "candidate contained no text parts".into(),
            ));
        }

        Ok(text)
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn generate(&self, transcript: &[ChatMessage]) -> ProviderResult<String> {
        let api_key = self.api_key.as_ref().ok_or(ProviderError::Disabled)?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        );

        let request = GenerateRequest {
            contents: Self::convert_transcript(transcript),
        };

        tracing::debug!(
            "Sending Gemini request: model={}, {} turns",
            self.config.model,
            request.contents.len()
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                ProviderError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error)
                .map(|e| e.message)
                .filter(|m| !m.is_empty())
                .unwrap_or(body);
            tracing::error!("Gemini returned error {}: {}", status, message);
            return Err(Self::classify_status(status, message));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            ProviderError::Malformed(e.to_string())
        })?;

        Self::extract_text(parsed)
    }
}
