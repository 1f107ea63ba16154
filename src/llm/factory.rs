use super::compatible::OpenAiCompatibleProvider;
use super::gemini::GeminiProvider;
use super::traits::Provider;
use crate::config::LlmConfig;
use crate::error::ConfigError;
use std::sync::Arc;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Resolve the API key for a provider.
///
/// Resolution order:
/// 1. Explicit `api_key` (trimmed, ignored if empty)
/// 2. Provider-specific environment variable (`OPENAI_API_KEY`, `OPENROUTER_API_KEY`, ...)
/// 3. Generic fallbacks (`POSTWRIGHT_API_KEY`, `API_KEY`)
pub fn resolve_api_key(name: &str, explicit_api_key: Option<&str>) -> Option<String> {
    if let Some(key) = explicit_api_key.map(str::trim).filter(|k| !k.is_empty()) {
        return Some(key.to_string());
    }

    let provider_env_candidates: &[&str] = match name {
        "openai" => &["OPENAI_API_KEY"],
        "openrouter" => &["OPENROUTER_API_KEY"],
        "gemini" | "google" => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
        _ => &[],
    };

    provider_env_candidates
        .iter()
        .chain(["POSTWRIGHT_API_KEY", "API_KEY"].iter())
        .find_map(|env_var| {
            std::env::var(env_var)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
}

/// Create a shared [`Provider`] from the `[llm]` config section.
///
/// Supported providers:
/// - `"openai"`: native OpenAI API
/// - `"openrouter"`: OpenRouter aggregator
/// - `"gemini"` / `"google"`: native Gemini API
/// - `"custom:<base_url>"`: any OpenAI-compatible endpoint
///
/// `base_url` in the config overrides the built-in endpoint of the first three.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn Provider>, ConfigError> {
    let name = config.provider.trim();
    let resolved_key = resolve_api_key(name, config.api_key.as_deref());
    let api_key = resolved_key.as_deref();
    let base_override = config.base_url.as_deref().filter(|u| !u.trim().is_empty());
    let max_tokens = config.max_output_tokens;
    let timeout = config.timeout_secs;

    let provider: Arc<dyn Provider> = match name {
        "openai" => Arc::new(OpenAiCompatibleProvider::new(
            "openai",
            base_override.unwrap_or(OPENAI_BASE_URL),
            api_key,
            max_tokens,
            timeout,
        )),
        "openrouter" => Arc::new(OpenAiCompatibleProvider::new(
            "openrouter",
            base_override.unwrap_or(OPENROUTER_BASE_URL),
            api_key,
            max_tokens,
            timeout,
        )),
        "gemini" | "google" => Arc::new(match base_override {
            Some(base_url) => GeminiProvider::with_base_url(base_url, api_key, max_tokens, timeout),
            None => GeminiProvider::new(api_key, max_tokens, timeout),
        }),
        other => match other.strip_prefix("custom:") {
            Some("") => {
                return Err(ConfigError::UnknownProvider(
                    "custom provider requires a URL. Format: custom:https://your-api.com".into(),
                ));
            }
            Some(base_url) => Arc::new(OpenAiCompatibleProvider::new(
                "custom", base_url, api_key, max_tokens, timeout,
            )),
            None => {
                return Err(ConfigError::UnknownProvider(format!(
                    "{other}. Use openai, openrouter, gemini or custom:https://your-api.com"
                )));
            }
        },
    };

    tracing::debug!(provider = provider.name(), model = %config.model, "llm provider ready");
    Ok(provider)
}
