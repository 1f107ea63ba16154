use serde::{Deserialize, Serialize};
use std::fmt;

/// Formatting kinds as they appear on the Telegram wire.
///
/// Only the two hyperlink kinds take part in the rewrite pipeline; every other
/// entity type (bold, mentions, hashtags, ...) collapses into `Other` and is
/// dropped by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkKind {
    /// Custom anchor text with a hidden target (`text_link`).
    #[serde(rename = "text_link")]
    AnchoredLink,
    /// A URL that is visible in the text itself (`url`).
    #[serde(rename = "url")]
    BareUrl,
    #[serde(other)]
    Other,
}

/// A position-addressed hyperlink range.
///
/// `offset` and `length` are counted in UTF-16 code units, which is what the
/// Telegram Bot API uses for entity positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAnnotation {
    pub offset: usize,
    pub length: usize,
    #[serde(rename = "type")]
    pub kind: LinkKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl LinkAnnotation {
    pub fn anchored(offset: usize, length: usize, url: impl Into<String>) -> Self {
        Self {
            offset,
            length,
            kind: LinkKind::AnchoredLink,
            url: Some(url.into()),
        }
    }

    pub fn bare(offset: usize, length: usize) -> Self {
        Self {
            offset,
            length,
            kind: LinkKind::BareUrl,
            url: None,
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self.kind, LinkKind::AnchoredLink | LinkKind::BareUrl)
    }
}

/// Text plus its formatting ranges, as received from the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedText {
    pub content: String,
    #[serde(default)]
    pub annotations: Vec<LinkAnnotation>,
}

impl FormattedText {
    pub fn new(content: impl Into<String>, annotations: Vec<LinkAnnotation>) -> Self {
        Self {
            content: content.into(),
            annotations,
        }
    }

    pub fn plain(content: impl Into<String>) -> Self {
        Self::new(content, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

pub const TOKEN_OPEN: char = '⟦';
pub const TOKEN_CLOSE: char = '⟧';
pub const TOKEN_PREFIX: &str = "LINK:";

/// Placeholder substituted for a link before the text reaches the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkToken {
    id: u32,
}

impl LinkToken {
    pub fn new(id: u32) -> Self {
        Self { id }
    }

    pub fn id(self) -> u32 {
        self.id
    }
}

impl fmt::Display for LinkToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{TOKEN_OPEN}{TOKEN_PREFIX}{}{TOKEN_CLOSE}", self.id)
    }
}

/// What a token stands for. `anchor: None` restores as the canonical URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenRecord {
    #[serde(skip)]
    pub token: LinkToken,
    /// Rendered token, cached so searches don't re-format it.
    #[serde(rename = "token")]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    pub url: String,
}

impl TokenRecord {
    pub fn new(token: LinkToken, anchor: Option<String>, url: impl Into<String>) -> Self {
        Self {
            token,
            text: token.to_string(),
            anchor,
            url: url.into(),
        }
    }
}

/// Token → record mapping for one rewrite call, in allocation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TokenMap {
    records: Vec<TokenRecord>,
}

impl TokenMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens are allocated by the tokenizer only, so keys stay unique.
    pub(crate) fn insert(&mut self, record: TokenRecord) {
        debug_assert!(self.get(&record.text).is_none());
        self.records.push(record);
    }

    pub fn get(&self, token: &str) -> Option<&TokenRecord> {
        self.records.iter().find(|r| r.text == token)
    }

    pub fn by_id(&self, id: u32) -> Option<&TokenRecord> {
        self.records.iter().find(|r| r.token.id() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TokenRecord> {
        self.records.iter()
    }

    pub(crate) fn into_records(self) -> Vec<TokenRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a TokenMap {
    type Item = &'a TokenRecord;
    type IntoIter = std::slice::Iter<'a, TokenRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
