//! Generic OpenAI-compatible provider.
//! OpenAI, OpenRouter and most self-hosted gateways speak the same
//! `/chat/completions` format, so one implementation covers all of them.

use super::{build_provider_client_with_timeout, sanitize_api_error, traits::Provider};
use crate::error::UpstreamError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub struct OpenAiCompatibleProvider {
    pub(crate) name: String,
    pub(crate) api_key: Option<String>,
    max_output_tokens: u32,
    /// Pre-computed chat completions URL (avoids `format!` per request).
    chat_url: String,
    client: Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        name: &str,
        base_url: &str,
        api_key: Option<&str>,
        max_output_tokens: u32,
        timeout_secs: u64,
    ) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let chat_url = if base_url.ends_with("chat/completions") {
            base_url.to_string()
        } else {
            format!("{base_url}/chat/completions")
        };

        Self {
            name: name.to_string(),
            api_key: api_key.filter(|k| !k.is_empty()).map(ToString::to_string),
            max_output_tokens,
            chat_url,
            client: build_provider_client_with_timeout(timeout_secs),
        }
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

fn extract_chat_text(response: ChatResponse, provider_name: &str) -> Result<String, UpstreamError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| UpstreamError::EmptyResponse {
            provider: provider_name.to_string(),
        })
}

#[async_trait]
impl Provider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
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
                provider: self.name.clone(),
            }
            .into());
        };

        let mut messages = Vec::with_capacity(2);
        if let Some(sys) = system_prompt {
            messages.push(Message {
                role: "system",
                content: sys,
            });
        }
        messages.push(Message {
            role: "user",
            content: message,
        });

        let request = ChatRequest {
            model,
            messages,
            temperature,
            max_tokens: self.max_output_tokens,
        };

        let response = self
            .client
            .post(&self.chat_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| UpstreamError::Request {
                provider: self.name.clone(),
                message: sanitize_api_error(&e.to_string()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(
                UpstreamError::from_status(&self.name, status.as_u16(), sanitize_api_error(&body))
                    .into(),
            );
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| UpstreamError::Request {
            provider: self.name.clone(),
            message: format!("response decode failed: {e}"),
        })?;
        Ok(extract_chat_text(parsed, &self.name)?)
    }
}
