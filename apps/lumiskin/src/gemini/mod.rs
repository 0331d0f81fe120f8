//! Analysis Gateway — the single point of entry for all Gemini API calls.
//!
//! No other module may talk to the API directly. One invocation makes at
//! most one outbound request: there is no internal retry, and a failure at
//! any stage (credential, transport, status, empty body, schema) fails the
//! whole analysis with no partial result.

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::models::{AnalysisResult, ImageFile, UserPreferences};

pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
/// The model used for all analysis calls.
/// Intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gemini-2.5-flash";
/// Low-variance generation: the schema does the shaping, not sampling.
const TEMPERATURE: f64 = 0.4;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned empty content")]
    EmptyContent,

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

// ── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Text of the first text part of the first candidate, if any.
    fn text(&self) -> Option<&str> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .find_map(|p| p.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ── Gateway ─────────────────────────────────────────────────────────────────

/// The analysis boundary. The orchestrator and UI depend on this trait, not
/// on the concrete client, so tests can stub the network away.
#[async_trait::async_trait]
pub trait SkinAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        image: &ImageFile,
        preferences: &UserPreferences,
    ) -> Result<AnalysisResult, GeminiError>;
}

/// The single Gemini client used by the consultation flow.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl GeminiClient {
    /// `api_key` is `None` when the environment does not provide one; the
    /// first analysis attempt then fails before any network I/O.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{GEMINI_API_BASE}/models/{MODEL}:generateContent")
    }
}

#[async_trait::async_trait]
impl SkinAnalyzer for GeminiClient {
    async fn analyze(
        &self,
        image: &ImageFile,
        preferences: &UserPreferences,
    ) -> Result<AnalysisResult, GeminiError> {
        let api_key = self.api_key.as_deref().ok_or(GeminiError::MissingApiKey)?;

        let request_body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type: image.mime_type.clone(),
                            data: general_purpose::STANDARD.encode(&image.bytes),
                        }),
                        text: None,
                    },
                    Part {
                        inline_data: None,
                        text: Some(build_analysis_prompt(preferences)),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: prompts::response_schema(),
                temperature: TEMPERATURE,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let api_response: GenerateContentResponse = response.json().await?;
        let text = api_response.text().ok_or(GeminiError::EmptyContent)?;

        debug!("Analysis response received: {} chars", text.len());

        parse_analysis(text)
    }
}

/// Fills the prompt template with the user's selections.
pub fn build_analysis_prompt(preferences: &UserPreferences) -> String {
    prompts::ANALYSIS_PROMPT_TEMPLATE
        .replace("{skin_type}", preferences.skin_type.label())
        .replace("{concerns}", &preferences.concerns_joined())
        .replace("{budget}", preferences.budget.label())
}

/// Parses the model's text output into an [`AnalysisResult`].
fn parse_analysis(text: &str) -> Result<AnalysisResult, GeminiError> {
    let text = strip_json_fences(text);
    serde_json::from_str(text).map_err(GeminiError::Parse)
}

/// Strips ```json ... ``` or ``` ... ``` code fences. The schema-constrained
/// call should return bare JSON, but models occasionally wrap it anyway.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
