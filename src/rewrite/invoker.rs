use super::instruction::compose_prompt;
use crate::config::{LlmConfig, PromptMode};
use crate::error::UpstreamError;
use crate::llm::{Provider, sanitize_api_error};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// The opaque rewrite step: instruction and text in, rewritten text out.
///
/// Implementations never retry; callers own the retry policy.
#[async_trait]
pub trait Rewriter: Send + Sync {
    async fn rewrite(&self, instruction: &str, text: &str) -> Result<String, UpstreamError>;
}

/// [`Rewriter`] backed by a chat [`Provider`].
pub struct LlmRewriter {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f64,
    timeout: Duration,
    prompt_mode: PromptMode,
}

impl LlmRewriter {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        let defaults = LlmConfig::default();
        Self {
            provider,
            model: model.into(),
            temperature: defaults.temperature,
            timeout: defaults.timeout(),
            prompt_mode: defaults.prompt_mode,
        }
    }

    pub fn from_config(provider: Arc<dyn Provider>, config: &LlmConfig) -> Self {
        Self::new(provider, config.model.clone())
            .with_temperature(config.temperature)
            .with_timeout(config.timeout())
            .with_prompt_mode(config.prompt_mode)
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_prompt_mode(mut self, prompt_mode: PromptMode) -> Self {
        self.prompt_mode = prompt_mode;
        self
    }

    async fn call(&self, instruction: &str, text: &str) -> anyhow::Result<String> {
        match self.prompt_mode {
            PromptMode::Inline => {
                let prompt = compose_prompt(instruction, text);
                self.provider
                    .chat(&prompt, &self.model, self.temperature)
                    .await
            }
            PromptMode::System => {
                self.provider
                    .chat_with_system(Some(instruction), text, &self.model, self.temperature)
                    .await
            }
        }
    }
}

#[async_trait]
impl Rewriter for LlmRewriter {
    async fn rewrite(&self, instruction: &str, text: &str) -> Result<String, UpstreamError> {
        if text.trim().is_empty() {
            tracing::debug!("empty input, skipping model call");
            return Ok(String::new());
        }

        let provider = self.provider.name().to_string();
        tracing::debug!(provider = %provider, model = %self.model, chars = text.chars().count(), "rewrite requested");

        let reply = tokio::time::timeout(self.timeout, self.call(instruction, text))
            .await
            .map_err(|_| UpstreamError::Timeout {
                provider: provider.clone(),
                secs: self.timeout.as_secs(),
            })?
            .map_err(|e| {
                e.downcast::<UpstreamError>()
                    .unwrap_or_else(|other| UpstreamError::Request {
                        provider: provider.clone(),
                        message: sanitize_api_error(&format!("{other:#}")),
                    })
            })?;

        Ok(reply.trim().to_string())
    }
}
