pub mod instruction;
pub mod invoker;
pub mod pipeline;

pub use instruction::{DEFAULT_STYLE_RULES, build_instruction, compose_prompt, token_contract};
pub use invoker::{LlmRewriter, Rewriter};
pub use pipeline::{RewritePipeline, RewrittenPost, rewrite_with_config};
