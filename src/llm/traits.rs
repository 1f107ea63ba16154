use async_trait::async_trait;

/// A text-generation backend.
///
/// Implementations report failures as [`crate::error::UpstreamError`] wrapped
/// in `anyhow`, so callers can downcast to decide what went wrong.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider identifier (e.g. "openai", "gemini").
    fn name(&self) -> &str;

    async fn chat_with_system(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String>;

    async fn chat(&self, message: &str, model: &str, temperature: f64) -> anyhow::Result<String> {
        self.chat_with_system(None, message, model, temperature)
            .await
    }
}
