use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

/// Query parameters stripped from every link before it is published.
/// Matched case-insensitively against the decoded parameter name.
pub const TRACKING_PARAMS: &[&str] = &[
    // UTM
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    // Common referral
    "ref",
    "referral",
    "source",
    "campaign",
    // Facebook / Meta
    "fbclid",
    "fb_action_ids",
    "fb_action_types",
    "fb_source",
    "fb_ref",
    // Google
    "gclid",
    "gclsrc",
    "dclid",
    "_ga",
    "_gl",
    "_gac",
    // Yandex
    "yclid",
    "ysclid",
    "ymclid",
    // Email / marketing
    "mc_eid",
    "mc_cid",
    "mkt_tok",
    // Social
    "igshid",
    "share_id",
    "si",
    "feature",
    "share_source",
    "vn_source",
    // Twitter / X
    "twclid",
    "s",
    "t",
    // General tracking
    "spm",
    "scm",
    "aff_id",
    "aff_sub",
    "clickid",
    "trk",
    "tracking_id",
];

static DEFAULT: LazyLock<Canonicalizer> = LazyLock::new(Canonicalizer::default);

/// Strip tracking parameters from `url` using the built-in deny-list.
pub fn canonicalize(url: &str) -> String {
    DEFAULT.canonicalize(url)
}

/// Removes deny-listed query parameters from URLs.
///
/// Only the query component is touched. Scheme, authority, path and fragment
/// are carried over byte-for-byte, and surviving parameters keep their
/// original order and encoding.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    deny: HashSet<String>,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::with_extra(std::iter::empty::<&str>())
    }
}

impl Canonicalizer {
    /// Built-in deny-list plus `extra` parameter names.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let deny = TRACKING_PARAMS
            .iter()
            .map(|p| (*p).to_string())
            .chain(extra.into_iter().map(|p| p.as_ref().to_ascii_lowercase()))
            .collect();
        Self { deny }
    }

    pub fn is_tracking_param(&self, name: &str) -> bool {
        self.deny.contains(&name.to_lowercase())
    }

    /// Like [`canonicalize`](Self::canonicalize) but reports malformed input.
    pub fn try_canonicalize(&self, raw: &str) -> Result<String, url::ParseError> {
        Url::parse(raw)?;

        let (before_fragment, fragment) = match raw.find('#') {
            Some(i) => raw.split_at(i),
            None => (raw, ""),
        };
        let Some(q) = before_fragment.find('?') else {
            return Ok(raw.to_string());
        };
        let (base, query) = (&before_fragment[..q], &before_fragment[q + 1..]);

        let mut removed = false;
        let kept: Vec<&str> = query
            .split('&')
            .filter(|pair| {
                if pair.is_empty() {
                    removed = true;
                    return false;
                }
                let tracking = self.is_tracking_param(&decoded_key(pair));
                removed |= tracking;
                !tracking
            })
            .collect();

        if !removed {
            return Ok(raw.to_string());
        }

        let mut out = String::with_capacity(raw.len());
        out.push_str(base);
        if !kept.is_empty() {
            out.push('?');
            out.push_str(&kept.join("&"));
        }
        out.push_str(fragment);
        Ok(out)
    }

    /// Strip tracking parameters; malformed URLs pass through unchanged.
    pub fn canonicalize(&self, raw: &str) -> String {
        match self.try_canonicalize(raw) {
            Ok(clean) => clean,
            Err(e) => {
                tracing::warn!(url = %truncate(raw, 50), error = %e, "malformed URL left as-is");
                raw.to_string()
            }
        }
    }
}

fn decoded_key(pair: &str) -> String {
    let key = pair.split_once('=').map_or(pair, |(k, _)| k);
    url::form_urlencoded::parse(key.as_bytes())
        .next()
        .map(|(k, _)| k.into_owned())
        .unwrap_or_default()
}

/// Char-safe prefix used when URLs or text land in log lines.
pub(crate) fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}
