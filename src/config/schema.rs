use crate::error::ConfigError;
use crate::links::Canonicalizer;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed at load time, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub links: LinksConfig,

    #[serde(default)]
    pub album: AlbumConfig,

    #[serde(default)]
    pub rewrite: RewriteConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Validation(format!(
                "llm.temperature must be within 0.0..=2.0, got {}",
                self.llm.temperature
            )));
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "llm.timeout_secs must be greater than zero".into(),
            ));
        }
        if self.album.latency_ms == 0 {
            return Err(ConfigError::Validation(
                "album.latency_ms must be greater than zero".into(),
            ));
        }
        if self.album.stale_after() <= self.album.latency() {
            return Err(ConfigError::Validation(
                "album.stale_after_secs must exceed album.latency_ms".into(),
            ));
        }
        Ok(())
    }

    /// Canonicalizer with the built-in deny-list plus configured extras.
    pub fn canonicalizer(&self) -> Canonicalizer {
        Canonicalizer::with_extra(&self.links.extra_tracking_params)
    }
}

// ── LLM ───────────────────────────────────────────────────────────

/// How the instruction reaches the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    /// Instruction and text combined into a single user message.
    #[default]
    Inline,
    /// Instruction sent as the system prompt, text as the user message.
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// `openai`, `openrouter`, `gemini` or `custom:<base-url>` (default: openai)
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Overrides the provider's default endpoint
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Deadline for a single rewrite call (default: 120)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub prompt_mode: PromptMode,
}

fn default_provider() -> String {
    "openai".into()
}

fn default_model() -> String {
    "gpt-4o".into()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_timeout_secs() -> u64 {
    120
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: None,
            base_url: None,
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_timeout_secs(),
            prompt_mode: PromptMode::default(),
        }
    }
}

// ── Links ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    /// Extra query parameters to strip, on top of the built-in list
    #[serde(default)]
    pub extra_tracking_params: Vec<String>,
    /// Fix `[LINK:0]`-style echoes of known tokens before restoring
    #[serde(default = "default_true")]
    pub repair_mangled_tokens: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            extra_tracking_params: Vec::new(),
            repair_mangled_tokens: true,
        }
    }
}

// ── Album ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumConfig {
    /// Debounce window after the first album part arrives (default: 500)
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    /// Buffered albums older than this are dropped (default: 60)
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
}

fn default_latency_ms() -> u64 {
    500
}

fn default_stale_after_secs() -> u64 {
    60
}

impl AlbumConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }
}

impl Default for AlbumConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            stale_after_secs: default_stale_after_secs(),
        }
    }
}

// ── Rewrite ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteConfig {
    /// Style rules appended after the link-token contract
    #[serde(default = "default_style_rules")]
    pub style_rules: String,
}

fn default_style_rules() -> String {
    crate::rewrite::instruction::DEFAULT_STYLE_RULES.to_string()
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            style_rules: default_style_rules(),
        }
    }
}
