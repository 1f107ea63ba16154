use super::detector::detect_urls;
use super::types::{LinkAnnotation, LinkKind, LinkToken, TokenMap, TokenRecord};
use super::units;
use super::warning::PipelineWarning;

/// Link-free text handed to the model, plus what each token stands for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
    pub tokens: TokenMap,
    pub warnings: Vec<PipelineWarning>,
}

impl Extraction {
    pub fn into_parts(self) -> (String, TokenMap) {
        (self.text, self.tokens)
    }
}

/// Hands out token ids, skipping any whose rendered token already occurs in
/// the source text.
struct TokenIds<'a> {
    next: u32,
    content: &'a str,
}

impl<'a> TokenIds<'a> {
    fn new(content: &'a str) -> Self {
        Self { next: 0, content }
    }

    fn allocate(&mut self) -> LinkToken {
        loop {
            let token = LinkToken::new(self.next);
            self.next += 1;
            if !self.content.contains(&token.to_string()) {
                return token;
            }
        }
    }
}

/// Replace every link in `content` with an opaque token.
///
/// Annotated links go first, rightmost first, so earlier offsets stay valid
/// while the text is being spliced; ids are handed out in that processing
/// order. Raw `http(s)://` runs left in the text are then tokenized left to
/// right, continuing the same id counter.
pub fn extract_links(content: &str, annotations: &[LinkAnnotation]) -> Extraction {
    let mut ids = TokenIds::new(content);
    let mut tokens = TokenMap::new();
    let mut warnings = Vec::new();
    let mut text = content.to_string();

    let mut links: Vec<&LinkAnnotation> = annotations.iter().filter(|a| a.is_link()).collect();
    links.sort_by(|a, b| b.offset.cmp(&a.offset));

    tracing::debug!(
        annotations = annotations.len(),
        links = links.len(),
        "tokenizing annotated links"
    );

    // Everything before `untouched_end` is still identical in `text` and `content`.
    let mut untouched_end = content.len();
    for annotation in links {
        let skip = |reason| PipelineWarning::InvalidAnnotation {
            offset: annotation.offset,
            length: annotation.length,
            reason,
        };

        let Some(range) = units::utf16_range(content, annotation.offset, annotation.length) else {
            skip("out of range or splits a character").emit(&mut warnings);
            continue;
        };
        if range.is_empty() {
            skip("empty range").emit(&mut warnings);
            continue;
        }
        if range.end > untouched_end {
            skip("overlaps another link").emit(&mut warnings);
            continue;
        }

        let covered = &content[range.clone()];
        let (anchor, url) = match (annotation.kind, annotation.url.as_deref()) {
            (LinkKind::AnchoredLink, Some(url)) if !url.is_empty() => {
                (Some(covered.to_string()), url.to_string())
            }
            (LinkKind::AnchoredLink, _) => {
                skip("anchored link without a URL").emit(&mut warnings);
                continue;
            }
            (LinkKind::BareUrl, _) => (None, covered.to_string()),
            (LinkKind::Other, _) => continue,
        };

        let token = ids.allocate();
        let record = TokenRecord::new(token, anchor, url);
        tracing::debug!(
            token = %record.text,
            anchor = record.anchor.as_deref().unwrap_or("-"),
            url = %super::canonical::truncate(&record.url, 50),
            "extracted annotated link"
        );
        text.replace_range(range.clone(), &record.text);
        tokens.insert(record);
        untouched_end = range.start;
    }

    let raw_urls = detect_urls(&text);
    if !raw_urls.is_empty() {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for range in raw_urls {
            let record = TokenRecord::new(ids.allocate(), None, &text[range.clone()]);
            tracing::debug!(token = %record.text, url = %super::canonical::truncate(&record.url, 50), "extracted raw URL");
            out.push_str(&text[last..range.start]);
            out.push_str(&record.text);
            tokens.insert(record);
            last = range.end;
        }
        out.push_str(&text[last..]);
        text = out;
    }

    tracing::info!(links = tokens.len(), "links extracted");
    Extraction {
        text,
        tokens,
        warnings,
    }
}
