#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]

pub mod album;
pub mod config;
pub mod error;
pub mod links;
pub mod llm;
pub mod rewrite;

pub use album::{Aggregation, GroupAggregator, GroupedMessage, IncomingPost, primary_text};
pub use config::Config;
pub use error::{ConfigError, PostwrightError, UpstreamError};
pub use links::{
    FormattedText, LinkAnnotation, LinkKind, PipelineWarning, TokenMap, canonicalize,
    extract_links, normalize_paragraphs, restore_links,
};
pub use rewrite::{LlmRewriter, RewritePipeline, RewrittenPost, Rewriter, rewrite_with_config};
