use super::canonical::truncate;
use serde::Serialize;
use std::fmt;

/// Non-fatal bookkeeping problems. The pipeline keeps going and hands these
/// back next to its best-effort result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    /// An input annotation could not be applied to the text.
    InvalidAnnotation {
        offset: usize,
        length: usize,
        reason: &'static str,
    },
    /// The model output no longer contains this token; its link is gone.
    TokenLost { token: String, url: String },
    /// A token-shaped string survived restoration (duplicate or invented).
    StrayToken { token: String },
    /// A link record could not be placed in the normalized text and was dropped.
    AnnotationUnreconciled { text: String, url: String },
    /// A URL could not be parsed and was published without canonicalization.
    MalformedUrl { url: String },
}

impl PipelineWarning {
    /// Log the warning and append it to `sink`.
    pub(crate) fn emit(self, sink: &mut Vec<Self>) {
        match &self {
            Self::TokenLost { .. } | Self::AnnotationUnreconciled { .. } => {
                tracing::error!("{self}");
            }
            _ => tracing::warn!("{self}"),
        }
        sink.push(self);
    }
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAnnotation {
                offset,
                length,
                reason,
            } => write!(f, "skipped link annotation at {offset}+{length}: {reason}"),
            Self::TokenLost { token, url } => {
                write!(f, "link token missing: {token} -> {}", truncate(url, 50))
            }
            Self::StrayToken { token } => write!(f, "stray link token left in text: {token}"),
            Self::AnnotationUnreconciled { text, url } => write!(
                f,
                "link text not found after normalization: '{}' -> {}",
                truncate(text, 30),
                truncate(url, 50)
            ),
            Self::MalformedUrl { url } => {
                write!(f, "malformed URL kept as-is: {}", truncate(url, 50))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_collects() {
        let mut sink = Vec::new();
        PipelineWarning::StrayToken {
            token: "⟦LINK:9⟧".into(),
        }
        .emit(&mut sink);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn display_truncates_long_urls() {
        let url = format!("https://example.com/{}", "a".repeat(100));
        let msg = PipelineWarning::TokenLost {
            token: "⟦LINK:0⟧".into(),
            url,
        }
        .to_string();
        assert!(msg.len() < 100);
        assert!(msg.contains("⟦LINK:0⟧"));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let value = serde_json::to_value(PipelineWarning::MalformedUrl { url: "x".into() }).unwrap();
        assert_eq!(value, serde_json::json!({"kind": "malformed_url", "url": "x"}));
    }
}
