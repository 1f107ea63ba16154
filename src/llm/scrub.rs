use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 200;
const REDACTED: &str = "[REDACTED]";

/// Key prefixes of the providers we talk to (OpenAI, OpenRouter, Google).
const PREFIX_PATTERNS: [&str; 5] = ["sk-", "sk-or-", "AIza", "ya29.", "eyJ"];

/// Places where a credential follows a fixed marker.
const MARKER_PATTERNS: [&str; 10] = [
    "Authorization: Bearer ",
    "authorization: bearer ",
    "x-goog-api-key: ",
    "api_key=",
    "access_token=",
    "key=",
    "\"api_key\":\"",
    "\"access_token\":\"",
    "\"token\":\"",
    "\"secret\":\"",
];

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '/' | '=')
}

fn secret_end(input: &str, from: usize) -> usize {
    input[from..]
        .char_indices()
        .find(|&(_, c)| !is_secret_char(c))
        .map_or(input.len(), |(i, _)| from + i)
}

fn redact_after(scrubbed: &mut String, marker: &str) {
    let mut search_from = 0;
    while let Some(rel) = scrubbed[search_from..].find(marker) {
        let start = search_from + rel;
        let value_start = start + marker.len();
        let end = secret_end(scrubbed, value_start);

        // A bare marker without a value is left alone.
        if end == value_start {
            search_from = value_start;
            continue;
        }

        scrubbed.replace_range(start..end, REDACTED);
        search_from = start + REDACTED.len();
    }
}

/// Redact provider keys and bearer tokens from text that may reach a log or
/// an error message.
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    let needs_scrubbing = PREFIX_PATTERNS
        .iter()
        .chain(MARKER_PATTERNS.iter())
        .any(|p| input.contains(p));
    if !needs_scrubbing {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for marker in MARKER_PATTERNS {
        redact_after(&mut scrubbed, marker);
    }
    for prefix in PREFIX_PATTERNS {
        redact_after(&mut scrubbed, prefix);
    }
    Cow::Owned(scrubbed)
}

/// Scrub secrets from a provider error body and cap its length.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);
    match scrubbed.char_indices().nth(MAX_API_ERROR_CHARS) {
        Some((end, _)) => format!("{}...", &scrubbed[..end]),
        None => scrubbed.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_clean_text_borrowed() {
        assert!(matches!(
            scrub_secret_patterns("model overloaded"),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn scrubs_openai_and_google_keys() {
        let input = "bad key sk-proj-abc123 and AIzaSyD-xyz_987";
        let scrubbed = scrub_secret_patterns(input);
        assert!(!scrubbed.contains("abc123"));
        assert!(!scrubbed.contains("SyD-xyz_987"));
        assert_eq!(scrubbed.matches(REDACTED).count(), 2);
    }

    #[test]
    fn scrubs_markers() {
        let input = r#"{"error":"invalid api_key=raw-secret-123 access_token=eyJhbGciOi"}"#;
        let scrubbed = scrub_secret_patterns(input);
        assert!(!scrubbed.contains("raw-secret-123"));
        assert!(!scrubbed.contains("eyJhbGciOi"));
    }

    #[test]
    fn scrubs_query_key() {
        let scrubbed =
            scrub_secret_patterns("error sending request for url (https://g.api/m:generate?key=s3cr3t)");
        assert!(!scrubbed.contains("s3cr3t"));
    }

    #[test]
    fn sanitize_truncates_long_bodies() {
        let body = "é".repeat(500);
        let sanitized = sanitize_api_error(&body);
        assert!(sanitized.ends_with("..."));
        assert_eq!(sanitized.chars().count(), MAX_API_ERROR_CHARS + 3);
    }
}
