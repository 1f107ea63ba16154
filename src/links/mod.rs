pub mod canonical;
pub mod detector;
pub mod normalize;
pub mod restorer;
pub mod tokenizer;
pub mod types;
pub mod units;
pub mod warning;

pub use canonical::{Canonicalizer, TRACKING_PARAMS, canonicalize};
pub use detector::detect_urls;
pub use normalize::{
    DeletionAligner, Normalized, OffsetAligner, OffsetMap, normalize_paragraphs,
    normalize_paragraphs_with, normalize_text,
};
pub use restorer::{Restoration, missing_tokens, repair_tokens, restore_links, restore_links_with};
pub use tokenizer::{Extraction, extract_links};
pub use types::{FormattedText, LinkAnnotation, LinkKind, LinkToken, TokenMap, TokenRecord};
pub use warning::PipelineWarning;
