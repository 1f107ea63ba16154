use super::types::LinkAnnotation;
use super::units;
use super::warning::PipelineWarning;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static EXCESS_BREAKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n{3,}").unwrap_or_else(|e| panic!("line-break pattern must compile: {e}"))
});

/// Collapse runs of three or more line breaks into one blank line and trim
/// the whole text.
pub fn normalize_text(text: &str) -> String {
    EXCESS_BREAKS.replace_all(text, "\n\n").trim().to_string()
}

/// Original → normalized UTF-16 offsets for every character that survived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetMap {
    map: HashMap<usize, usize>,
}

impl OffsetMap {
    pub fn insert(&mut self, original: usize, normalized: usize) {
        self.map.insert(original, normalized);
    }

    pub fn get(&self, original: usize) -> Option<usize> {
        self.map.get(&original).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Computes how positions in a text move under normalization.
pub trait OffsetAligner: Send + Sync {
    fn align(&self, original: &str, normalized: &str) -> OffsetMap;
}

/// Two-cursor alignment for normalizations that only delete characters.
///
/// Matching characters advance both cursors; a mismatch is taken to be a
/// deleted character and advances the original cursor only.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeletionAligner;

impl OffsetAligner for DeletionAligner {
    fn align(&self, original: &str, normalized: &str) -> OffsetMap {
        let mut map = OffsetMap::default();
        let mut orig = original.chars().peekable();
        let mut norm = normalized.chars().peekable();
        let (mut oi, mut ni) = (0, 0);

        while let (Some(&oc), Some(&nc)) = (orig.peek(), norm.peek()) {
            if oc == nc {
                map.insert(oi, ni);
                ni += nc.len_utf16();
                norm.next();
            }
            oi += oc.len_utf16();
            orig.next();
        }

        map
    }
}

/// Normalized text with link entities moved to match it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    pub links: Vec<LinkAnnotation>,
    pub warnings: Vec<PipelineWarning>,
}

impl Normalized {
    pub fn into_parts(self) -> (String, Vec<LinkAnnotation>) {
        (self.text, self.links)
    }
}

/// Normalize paragraphs and remap `links` with the deletion-only aligner.
pub fn normalize_paragraphs(text: &str, links: &[LinkAnnotation]) -> Normalized {
    normalize_paragraphs_with(text, links, &DeletionAligner)
}

/// Normalize paragraphs and remap `links` with a caller-chosen aligner.
///
/// A link whose aligned position does not cover its original text falls back
/// to the first occurrence of that text; if that fails too it is dropped. An
/// entity is never emitted at a position that does not hold its text.
pub fn normalize_paragraphs_with(
    text: &str,
    links: &[LinkAnnotation],
    aligner: &dyn OffsetAligner,
) -> Normalized {
    let normalized = normalize_text(text);
    let mut warnings = Vec::new();

    if links.is_empty() {
        return Normalized {
            text: normalized,
            links: Vec::new(),
            warnings,
        };
    }

    let offsets = aligner.align(text, &normalized);
    let mut remapped = Vec::with_capacity(links.len());

    for link in links {
        let url = link.url.clone().unwrap_or_default();
        let Some(link_text) = units::utf16_slice(text, link.offset, link.length) else {
            PipelineWarning::AnnotationUnreconciled {
                text: String::new(),
                url,
            }
            .emit(&mut warnings);
            continue;
        };

        let aligned = offsets
            .get(link.offset)
            .filter(|&at| units::utf16_slice(&normalized, at, link.length) == Some(link_text));
        let searched = || {
            normalized
                .find(link_text)
                .map(|byte| units::byte_to_utf16(&normalized, byte))
        };

        match aligned.or_else(searched) {
            Some(offset) => remapped.push(LinkAnnotation {
                offset,
                ..link.clone()
            }),
            None => PipelineWarning::AnnotationUnreconciled {
                text: link_text.to_string(),
                url,
            }
            .emit(&mut warnings),
        }
    }

    Normalized {
        text: normalized,
        links: remapped,
        warnings,
    }
}
