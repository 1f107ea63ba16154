use super::canonical::{Canonicalizer, truncate};
use super::types::{LinkAnnotation, TOKEN_CLOSE, TOKEN_OPEN, TOKEN_PREFIX, TokenMap, TokenRecord};
use super::units;
use super::warning::PipelineWarning;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Restored text with positioned link entities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Restoration {
    pub text: String,
    /// Offsets in UTF-16 units, ascending.
    pub links: Vec<LinkAnnotation>,
    pub warnings: Vec<PipelineWarning>,
}

impl Restoration {
    pub fn into_parts(self) -> (String, Vec<LinkAnnotation>) {
        (self.text, self.links)
    }
}

/// Exact-form tokens, for spotting leftovers after restoration.
static EXACT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"⟦LINK:\d+⟧").unwrap_or_else(|e| panic!("token pattern must compile: {e}"))
});

/// Tokens echoed with ASCII brackets or inner padding: `[LINK:0]`, `⟦ LINK: 0 ⟧`.
static MANGLED_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[⟦\[]\s*LINK\s*:\s*(\d+)\s*[⟧\]]")
        .unwrap_or_else(|e| panic!("mangled token pattern must compile: {e}"))
});

/// Rewrite mangled echoes of known tokens back to their exact form.
///
/// Only ids present in `tokens` whose exact token is missing from `text` are
/// repaired, and only their first mangled occurrence, so nothing new is
/// invented.
pub fn repair_tokens(text: &str, tokens: &TokenMap) -> String {
    let mut repaired = std::collections::HashSet::new();
    let out = MANGLED_TOKEN.replace_all(text, |caps: &Captures<'_>| {
        let whole = &caps[0];
        let record = caps[1].parse::<u32>().ok().and_then(|id| tokens.by_id(id));
        match record {
            Some(record)
                if whole != record.text
                    && !text.contains(&record.text)
                    && repaired.insert(record.token) =>
            {
                tracing::warn!(found = whole, token = %record.text, "repaired mangled link token");
                record.text.clone()
            }
            _ => whole.to_string(),
        }
    });
    out.into_owned()
}

/// Replace tokens in model output with their anchors or canonical URLs.
pub fn restore_links(text: &str, tokens: &TokenMap) -> Restoration {
    restore_links_with(text, tokens, &Canonicalizer::default())
}

/// [`restore_links`] with a caller-supplied canonicalizer.
///
/// Tokens are resolved in order of first appearance in the current text.
/// Each splice only changes text at or after the match, so the search resumes
/// from the end of the last replacement and earlier entity offsets stay
/// valid. Tokens the model dropped are reported, never fatal.
pub fn restore_links_with(
    text: &str,
    tokens: &TokenMap,
    canonicalizer: &Canonicalizer,
) -> Restoration {
    tracing::info!(tokens = tokens.len(), "restoring link tokens");

    let mut text = text.to_string();
    let mut links = Vec::new();
    let mut warnings = Vec::new();
    let mut remaining: Vec<TokenRecord> = tokens.clone().into_records();
    let mut cursor = 0;
    // UTF-16 offset of `cursor`, advanced incrementally.
    let mut cursor_utf16 = 0;

    while !remaining.is_empty() {
        let first = remaining
            .iter()
            .enumerate()
            .filter_map(|(i, r)| text[cursor..].find(&r.text).map(|pos| (cursor + pos, i)))
            .min();

        let Some((start, index)) = first else {
            for record in &remaining {
                PipelineWarning::TokenLost {
                    token: record.text.clone(),
                    url: record.url.clone(),
                }
                .emit(&mut warnings);
            }
            break;
        };

        let record = remaining.swap_remove(index);
        let url = match canonicalizer.try_canonicalize(&record.url) {
            Ok(url) => url,
            Err(_) => {
                PipelineWarning::MalformedUrl {
                    url: record.url.clone(),
                }
                .emit(&mut warnings);
                record.url.clone()
            }
        };
        let replacement = record.anchor.clone().unwrap_or_else(|| url.clone());

        let offset = cursor_utf16 + units::utf16_len(&text[cursor..start]);
        let length = units::utf16_len(&replacement);
        text.replace_range(start..start + record.text.len(), &replacement);

        tracing::debug!(
            token = %record.text,
            replacement = %truncate(&replacement, 30),
            url = %truncate(&url, 50),
            "restored link token"
        );
        if length > 0 {
            links.push(LinkAnnotation::anchored(offset, length, url));
        }

        cursor = start + replacement.len();
        cursor_utf16 = offset + length;
    }

    for stray in EXACT_TOKEN.find_iter(&text) {
        PipelineWarning::StrayToken {
            token: stray.as_str().to_string(),
        }
        .emit(&mut warnings);
    }

    tracing::info!(links = links.len(), "links restored");
    Restoration {
        text,
        links,
        warnings,
    }
}

/// Tokens of `tokens` that do not occur verbatim in `text`.
pub fn missing_tokens<'a>(text: &str, tokens: &'a TokenMap) -> Vec<&'a TokenRecord> {
    tokens.iter().filter(|r| !text.contains(&r.text)).collect()
}

/// True if `text` contains anything shaped like a link token.
pub fn has_token_markers(text: &str) -> bool {
    text.contains(TOKEN_OPEN) && text.contains(TOKEN_PREFIX) && text.contains(TOKEN_CLOSE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::tokenizer::extract_links;
    use crate::links::types::{LinkKind, LinkToken};
    use crate::links::units::utf16_slice;

    fn map(records: Vec<TokenRecord>) -> TokenMap {
        let mut map = TokenMap::new();
        for r in records {
            map.insert(r);
        }
        map
    }

    #[test]
    fn end_to_end_example_restores_both_links() {
        let content = "Check this here and also https://site.com/x?utm_source=ads";
        let (text, tokens) =
            extract_links(content, &[LinkAnnotation::anchored(11, 4, "https://a.co/y?ref=z")])
                .into_parts();
        let restored = restore_links(&text, &tokens);

        assert_eq!(restored.text, "Check this here and also https://site.com/x");
        assert_eq!(
            restored.links,
            vec![
                LinkAnnotation::anchored(11, 4, "https://a.co/y"),
                LinkAnnotation::anchored(25, 18, "https://site.com/x"),
            ]
        );
        assert!(restored.warnings.is_empty());
    }

    #[test]
    fn follows_textual_order_not_id_order() {
        let tokens = map(vec![
            TokenRecord::new(LinkToken::new(0), Some("second".into()), "https://2.com"),
            TokenRecord::new(LinkToken::new(1), Some("first".into()), "https://1.com"),
        ]);
        let restored = restore_links("⟦LINK:1⟧ then ⟦LINK:0⟧", &tokens);
        assert_eq!(restored.text, "first then second");
        assert_eq!(restored.links[0], LinkAnnotation::anchored(0, 5, "https://1.com"));
        assert_eq!(restored.links[1], LinkAnnotation::anchored(11, 6, "https://2.com"));
    }

    #[test]
    fn token_loss_degrades() {
        let tokens = map(vec![
            TokenRecord::new(LinkToken::new(0), Some("kept".into()), "https://k.com"),
            TokenRecord::new(LinkToken::new(1), Some("lost".into()), "https://l.com"),
        ]);
        let restored = restore_links("only ⟦LINK:0⟧ here", &tokens);
        assert_eq!(restored.text, "only kept here");
        assert_eq!(restored.links.len(), 1);
        assert_eq!(
            restored.warnings,
            vec![PipelineWarning::TokenLost {
                token: "⟦LINK:1⟧".into(),
                url: "https://l.com".into(),
            }]
        );
    }

    #[test]
    fn offsets_count_utf16_units() {
        let tokens = map(vec![TokenRecord::new(
            LinkToken::new(0),
            Some("тут".into()),
            "https://ru.example",
        )]);
        let restored = restore_links("😀 смотри ⟦LINK:0⟧!", &tokens);
        let link = &restored.links[0];
        assert_eq!(link.offset, 10);
        assert_eq!(utf16_slice(&restored.text, link.offset, link.length), Some("тут"));
    }

    #[test]
    fn duplicate_token_is_restored_once_and_reported() {
        let tokens = map(vec![TokenRecord::new(LinkToken::new(0), None, "https://x.com")]);
        let restored = restore_links("⟦LINK:0⟧ and ⟦LINK:0⟧", &tokens);
        assert_eq!(restored.text, "https://x.com and ⟦LINK:0⟧");
        assert_eq!(restored.links.len(), 1);
        assert_eq!(
            restored.warnings,
            vec![PipelineWarning::StrayToken {
                token: "⟦LINK:0⟧".into()
            }]
        );
    }

    #[test]
    fn malformed_url_is_kept_and_reported() {
        let tokens = map(vec![TokenRecord::new(
            LinkToken::new(0),
            Some("docs".into()),
            "not a url",
        )]);
        let restored = restore_links("read ⟦LINK:0⟧", &tokens);
        assert_eq!(restored.links[0].url.as_deref(), Some("not a url"));
        assert!(matches!(restored.warnings[0], PipelineWarning::MalformedUrl { .. }));
    }

    #[test]
    fn restored_entities_are_text_links() {
        let tokens = map(vec![TokenRecord::new(LinkToken::new(0), None, "https://x.com")]);
        let restored = restore_links("⟦LINK:0⟧", &tokens);
        assert_eq!(restored.links[0].kind, LinkKind::AnchoredLink);
    }

    #[test]
    fn repair_fixes_known_ids_only() {
        let tokens = map(vec![
            TokenRecord::new(LinkToken::new(0), None, "https://a.com"),
            TokenRecord::new(LinkToken::new(1), None, "https://b.com"),
        ]);
        let repaired = repair_tokens("x [LINK:0] y ⟦ LINK: 1 ⟧ z [LINK:7]", &tokens);
        assert_eq!(repaired, "x ⟦LINK:0⟧ y ⟦LINK:1⟧ z [LINK:7]");
    }

    #[test]
    fn repair_leaves_present_tokens_alone() {
        let tokens = map(vec![TokenRecord::new(LinkToken::new(0), None, "https://a.com")]);
        let text = "⟦LINK:0⟧ and [LINK:0]";
        assert_eq!(repair_tokens(text, &tokens), text);
    }

    #[test]
    fn missing_tokens_lists_absent() {
        let tokens = map(vec![
            TokenRecord::new(LinkToken::new(0), None, "https://a.com"),
            TokenRecord::new(LinkToken::new(1), None, "https://b.com"),
        ]);
        let missing = missing_tokens("⟦LINK:1⟧", &tokens);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].token.id(), 0);
        assert!(has_token_markers("a ⟦LINK:1⟧"));
        assert!(!has_token_markers("plain"));
    }
}
