use super::aggregator::GroupedMessage;
use crate::links::{FormattedText, LinkAnnotation};
use serde::{Deserialize, Serialize};

/// The parts of a Telegram message the rewrite flow reads.
///
/// Field names follow the Bot API, so a raw `Message` object deserializes
/// directly; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingPost {
    pub message_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub entities: Vec<LinkAnnotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default)]
    pub caption_entities: Vec<LinkAnnotation>,
}

impl IncomingPost {
    /// Message text with its entities, else the media caption with its
    /// caption entities.
    pub fn formatted_text(&self) -> Option<FormattedText> {
        if let Some(text) = self.text.as_deref().filter(|t| !t.is_empty()) {
            return Some(FormattedText::new(text, self.entities.clone()));
        }
        self.caption
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(|caption| FormattedText::new(caption, self.caption_entities.clone()))
    }
}

impl GroupedMessage for IncomingPost {
    fn group_id(&self) -> Option<&str> {
        self.media_group_id.as_deref()
    }

    fn sequence(&self) -> i64 {
        self.message_id
    }
}

/// Text of an album: the first member, in batch order, that carries any.
///
/// Telegram puts the album caption on one item only, usually the first.
pub fn primary_text(batch: &[IncomingPost]) -> Option<FormattedText> {
    batch.iter().find_map(IncomingPost::formatted_text)
}
