//! Google Gemini provider (`generateContent`), authenticated with an API key
//! from config or the `GEMINI_API_KEY` / `GOOGLE_API_KEY` environment
//! variables.

use crate::error::UpstreamError;
use crate::llm::{build_provider_client_with_timeout, sanitize_api_error, traits::Provider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiProvider {
    api_key: Option<String>,
    base_url: String,
    max_output_tokens: u32,
    client: Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    /// Reasoning summaries from thinking models; not part of the answer.
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl GeminiProvider {
    /// Authentication priority: explicit key, then `GEMINI_API_KEY`, then
    /// `GOOGLE_API_KEY`.
    pub fn new(api_key: Option<&str>, max_output_tokens: u32, timeout_secs: u64) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, max_output_tokens, timeout_secs)
    }

    pub fn with_base_url(
        base_url: &str,
        api_key: Option<&str>,
        max_output_tokens: u32,
        timeout_secs: u64,
    ) -> Self {
        let resolved_key = api_key
            .filter(|k| !k.is_empty())
            .map(String::from)
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .filter(|k| !k.is_empty());

        Self {
            api_key: resolved_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_output_tokens,
            client: build_provider_client_with_timeout(timeout_secs),
        }
    }

    fn model_name(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        }
    }

    fn extract_text(response: GenerateContentResponse) -> Result<String, UpstreamError> {
        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter(|p| !p.thought)
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(UpstreamError::EmptyResponse {
                provider: "gemini".into(),
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn chat_with_system(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(UpstreamError::MissingApiKey {
                provider: "gemini".into(),
            }
            .into());
        };

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: message }],
            }],
            system_instruction: system_prompt.map(|sys| Content {
                role: None,
                parts: vec![Part { text: sys }],
            }),
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let url = format!(
            "{}/v1beta/{}:generateContent",
            self.base_url,
            Self::model_name(model)
        );
        // Header auth keeps the key out of URLs, which reqwest echoes in errors.
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| UpstreamError::Request {
                provider: "gemini".into(),
                message: sanitize_api_error(&e.to_string()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(
                UpstreamError::from_status("gemini", status.as_u16(), sanitize_api_error(&body))
                    .into(),
            );
        }

        let parsed: GenerateContentResponse =
            response.json().await.map_err(|e| UpstreamError::Request {
                provider: "gemini".into(),
                message: format!("response decode failed: {e}"),
            })?;

        if let Some(err) = parsed.error.as_ref() {
            return Err(UpstreamError::Request {
                provider: "gemini".into(),
                message: sanitize_api_error(&err.message),
            }
            .into());
        }

        Ok(Self::extract_text(parsed)?)
    }
}
