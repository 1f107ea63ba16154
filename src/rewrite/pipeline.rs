use super::instruction::build_instruction;
use super::invoker::{LlmRewriter, Rewriter};
use crate::config::Config;
use crate::error::{ConfigError, UpstreamError};
use crate::links::canonical::truncate;
use crate::links::restorer::has_token_markers;
use crate::links::{
    Canonicalizer, DeletionAligner, FormattedText, LinkAnnotation, OffsetAligner, PipelineWarning,
    extract_links, missing_tokens, normalize_paragraphs_with, repair_tokens, restore_links_with,
};
use serde::Serialize;
use std::sync::Arc;

/// Final text and link entities, ready to publish.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewrittenPost {
    pub text: String,
    /// Link entities with UTF-16 offsets into `text`.
    #[serde(rename = "entities")]
    pub links: Vec<LinkAnnotation>,
    pub warnings: Vec<PipelineWarning>,
}

/// Tokenize, rewrite, restore and normalize one post.
///
/// Holds no per-post state, so one pipeline can serve concurrent posts.
pub struct RewritePipeline {
    rewriter: Arc<dyn Rewriter>,
    instruction: String,
    canonicalizer: Canonicalizer,
    aligner: Box<dyn OffsetAligner>,
    repair_mangled_tokens: bool,
}

impl RewritePipeline {
    pub fn new(rewriter: Arc<dyn Rewriter>, instruction: impl Into<String>) -> Self {
        Self {
            rewriter,
            instruction: instruction.into(),
            canonicalizer: Canonicalizer::default(),
            aligner: Box::new(DeletionAligner),
            repair_mangled_tokens: true,
        }
    }

    /// Pipeline backed by the configured provider, style rules and link settings.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let provider = crate::llm::create_provider(&config.llm)?;
        let rewriter = LlmRewriter::from_config(provider, &config.llm);
        Ok(
            Self::new(Arc::new(rewriter), build_instruction(&config.rewrite.style_rules))
                .with_canonicalizer(config.canonicalizer())
                .with_token_repair(config.links.repair_mangled_tokens),
        )
    }

    #[must_use]
    pub fn with_canonicalizer(mut self, canonicalizer: Canonicalizer) -> Self {
        self.canonicalizer = canonicalizer;
        self
    }

    #[must_use]
    pub fn with_aligner(mut self, aligner: Box<dyn OffsetAligner>) -> Self {
        self.aligner = aligner;
        self
    }

    #[must_use]
    pub fn with_token_repair(mut self, enabled: bool) -> Self {
        self.repair_mangled_tokens = enabled;
        self
    }

    /// Run one post through the pipeline.
    ///
    /// Only a failed rewrite call is an error. Bookkeeping problems come back
    /// as warnings next to a best-effort result.
    pub async fn run(&self, post: &FormattedText) -> Result<RewrittenPost, UpstreamError> {
        let extraction = extract_links(&post.content, &post.annotations);
        let mut warnings = extraction.warnings;
        let tokens = extraction.tokens;
        tracing::info!(
            links = tokens.len(),
            preview = truncate(&extraction.text, 200),
            "links extracted"
        );

        let raw = self.rewriter.rewrite(&self.instruction, &extraction.text).await?;
        tracing::info!(preview = truncate(&raw, 200), "model output received");

        let raw = if self.repair_mangled_tokens && !tokens.is_empty() {
            repair_tokens(&raw, &tokens)
        } else {
            raw
        };

        // Per-token detail is logged by the restorer as `TokenLost`.
        let missing = missing_tokens(&raw, &tokens).len();
        if missing > 0 {
            tracing::warn!(
                missing,
                expected = tokens.len(),
                any_markers = has_token_markers(&raw),
                "model output is missing link tokens"
            );
        }

        let restoration = restore_links_with(&raw, &tokens, &self.canonicalizer);
        warnings.extend(restoration.warnings);

        let normalized =
            normalize_paragraphs_with(&restoration.text, &restoration.links, self.aligner.as_ref());
        warnings.extend(normalized.warnings);

        tracing::info!(
            links = normalized.links.len(),
            warnings = warnings.len(),
            "post rewritten"
        );
        Ok(RewrittenPost {
            text: normalized.text,
            links: normalized.links,
            warnings,
        })
    }
}

/// Build a pipeline from `config` and run one post through it.
pub async fn rewrite_with_config(
    config: &Config,
    post: &FormattedText,
) -> crate::error::Result<RewrittenPost> {
    let pipeline = RewritePipeline::from_config(config)?;
    Ok(pipeline.run(post).await?)
}
