use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `postwright`.
///
/// Only failures of the external rewrite capability and of configuration
/// surface as errors. Bookkeeping problems inside the link pipeline degrade
/// into [`crate::links::PipelineWarning`] values instead.
#[derive(Debug, Error)]
pub enum PostwrightError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Rewrite capability ──────────────────────────────────────────────
    #[error("upstream: {0}")]
    Upstream(#[from] UpstreamError),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Rewrite capability errors ───────────────────────────────────────────────

/// Failure of the opaque text-generation step. Callers decide retry policy.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{provider} API key not set")]
    MissingApiKey { provider: String },

    #[error("provider {provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("provider {provider} returned {status}: {message}")]
    Status {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("provider {provider} authentication failed")]
    Auth { provider: String },

    #[error("provider {provider} rate-limited")]
    RateLimited { provider: String },

    #[error("provider {provider} timed out after {secs}s")]
    Timeout { provider: String, secs: u64 },

    #[error("no response from {provider}")]
    EmptyResponse { provider: String },
}

impl UpstreamError {
    /// Classify a non-success HTTP status into the matching variant.
    pub fn from_status(provider: &str, status: u16, message: String) -> Self {
        match status {
            401 | 403 => Self::Auth {
                provider: provider.to_string(),
            },
            429 => Self::RateLimited {
                provider: provider.to_string(),
            },
            _ => Self::Status {
                provider: provider.to_string(),
                status,
                message,
            },
        }
    }
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, PostwrightError>;
