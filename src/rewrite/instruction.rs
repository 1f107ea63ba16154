//! Instruction payload sent alongside the tokenized text.
//!
//! The link-token contract always comes first; caller style rules are layered
//! underneath and are not enforced by the pipeline.

use crate::links::LinkToken;

/// Default paragraph and punctuation rules for a Telegram post.
pub const DEFAULT_STYLE_RULES: &str = "\
Before writing, work out what the post is: an observation, a question, an \
experience, a plain fact. Let the tone follow from the thought itself; do not \
pick a default tone.

Structure:
- Telegram post. Separate paragraphs with exactly one blank line.
- One paragraph is one complete thought of 2-4 sentences. Aim for 2-5 paragraphs.
- No one-line paragraphs and no wall of text.
- Lists only where a list is the natural form of the thought.
- Do not end the last sentence of a paragraph with a period.

Language:
- Informal, not academic. Keep professional jargon as is.
- No filler, no hype, no closing summary.

Punctuation:
- Use only the short hyphen (-). Never use the em dash or the en dash.";

/// Render the token contract for the current token format.
pub fn token_contract() -> String {
    let first = LinkToken::new(0);
    let second = LinkToken::new(1);
    format!(
        "LINK TOKENS (critical):\n\
         - Strings like {first} and {second} in the source text mark links.\n\
         - Every token must appear in your output exactly once, in exactly the same form.\n\
         - Do not delete, reformat or duplicate tokens.\n\
         - Never create new tokens that were not in the source text.\n\
         - Never replace product, model or version names with tokens.\n\
         - A missing or extra token is a critical error."
    )
}

/// Token contract followed by the caller's style rules.
pub fn build_instruction(style_rules: &str) -> String {
    let contract = token_contract();
    let style_rules = style_rules.trim();
    if style_rules.is_empty() {
        contract
    } else {
        format!("{contract}\n\n{style_rules}")
    }
}

/// Single-message prompt for providers used in inline mode.
pub fn compose_prompt(instruction: &str, text: &str) -> String {
    format!("{instruction}\n\n---\n\nSource text to rewrite:\n\n{text}")
}
