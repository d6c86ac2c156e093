//! Remote generation client.
//!
//! [`ImageModel`] is the seam the orchestrator calls through; [`GeminiClient`]
//! implements it against the Gemini `generateContent` endpoint.

use crate::content::ContentPart;
use async_trait::async_trait;
use gemini_image_mcp_common::config::Config;
use gemini_image_mcp_common::error::Error;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// A model that turns content parts into a (possibly empty) set of candidates.
#[async_trait]
pub trait ImageModel: Send + Sync {
    async fn generate(&self, model: &str, parts: &[ContentPart]) -> Result<GeminiResponse, Error>;
}

/// HTTP client for the Gemini Developer API.
pub struct GeminiClient {
    http: reqwest::Client,
    config: Config,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: config.clone(),
        }
    }

    /// Build the request body for the given parts.
    pub fn build_request(parts: &[ContentPart]) -> GeminiImageRequest {
        let parts = parts
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => GeminiPart::Text { text: text.clone() },
                ContentPart::InlineImage { mime_type, data } => GeminiPart::InlineData {
                    inline_data: GeminiInlineData {
                        mime_type: mime_type.clone(),
                        data: data.clone(),
                    },
                },
            })
            .collect();

        GeminiImageRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts,
            }],
            generation_config: GeminiGenerationConfig {
                response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            },
        }
    }
}

#[async_trait]
impl ImageModel for GeminiClient {
    #[instrument(level = "debug", name = "gemini_generate", skip(self, parts), fields(parts = parts.len()))]
    async fn generate(&self, model: &str, parts: &[ContentPart]) -> Result<GeminiResponse, Error> {
        let endpoint = self.config.generate_content_endpoint(model);
        let request = Self::build_request(parts);

        debug!(endpoint = %endpoint, "Calling Gemini API for image generation");

        let response = self
            .http
            .post(&endpoint)
            .header("x-goog-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::api(&endpoint, 0, format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(&endpoint, status.as_u16(), body));
        }

        let response_text = response.text().await.map_err(|e| {
            Error::api(&endpoint, status.as_u16(), format!("Failed to read response: {}", e))
        })?;

        serde_json::from_str(&response_text).map_err(|e| {
            let preview: String = response_text.chars().take(500).collect();
            Error::api(
                &endpoint,
                status.as_u16(),
                format!("Failed to parse response: {}. Raw: {}", e, preview),
            )
        })
    }
}

// =============================================================================
// API Request/Response Types
// =============================================================================

/// `generateContent` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiImageRequest {
    pub contents: Vec<GeminiContent>,
    pub generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct GeminiContent {
    pub role: String,
    pub parts: Vec<GeminiPart>,
}

/// Request part.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    /// Response modalities (TEXT, IMAGE)
    pub response_modalities: Vec<String>,
}

/// `generateContent` response. Missing candidates deserialize as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    pub prompt_feedback: Option<GeminiPromptFeedback>,
}

/// Set when the prompt itself was blocked and no candidates were produced.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    pub content: Option<GeminiResponseContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiResponseContent {
    #[serde(default)]
    pub parts: Vec<GeminiResponsePart>,
}

/// Response part. Anything that is neither inline data nor text is kept
/// as raw JSON and ignored.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GeminiResponsePart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
    Text {
        text: String,
    },
    Other(serde_json::Value),
}

/// Base64 payload with its MIME type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiInlineData {
    #[serde(default)]
    pub mime_type: String,
    pub data: String,
}

impl GeminiResponse {
    /// Inline data parts across all candidates, in response order.
    pub fn inline_images(&self) -> impl Iterator<Item = &GeminiInlineData> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| match part {
                GeminiResponsePart::InlineData { inline_data } => Some(inline_data),
                _ => None,
            })
    }

    /// Why generation stopped: the prompt block reason when there are no
    /// candidates, otherwise each candidate's finish reason.
    pub fn stop_reasons(&self) -> Vec<&str> {
        if self.candidates.is_empty() {
            return self
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
                .into_iter()
                .collect();
        }
        self.candidates
            .iter()
            .filter_map(|c| c.finish_reason.as_deref())
            .collect()
    }

    /// Text parts across all candidates.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| match part {
                GeminiResponsePart::Text { text } => Some(text.as_str()),
                _ => None,
            })
    }
}
