// ── Infrastructure ───────────────────────────────────────────────────────────
pub mod http_client;
pub mod scrub;
pub mod traits;

// ── Provider implementations ────────────────────────────────────────────────
pub mod compatible;
pub mod factory;
pub mod gemini;

pub use http_client::build_provider_client_with_timeout;
pub use scrub::{sanitize_api_error, scrub_secret_patterns};
pub use traits::Provider;

pub use compatible::OpenAiCompatibleProvider;
pub use factory::{create_provider, resolve_api_key};
pub use gemini::GeminiProvider;
