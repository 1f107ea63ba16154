//! Conversions between UTF-8 byte indices (how Rust slices strings) and
//! UTF-16 code-unit offsets (how the Telegram Bot API counts entity
//! positions).

/// Length of `text` in UTF-16 code units.
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// UTF-16 offset of the byte index `byte` in `text`.
///
/// `byte` must lie on a char boundary.
pub fn byte_to_utf16(text: &str, byte: usize) -> usize {
    utf16_len(&text[..byte])
}

/// Byte index of the UTF-16 offset `offset` in `text`.
///
/// Returns `None` when the offset is past the end of the text or lands in the
/// middle of a surrogate pair.
pub fn utf16_to_byte(text: &str, offset: usize) -> Option<usize> {
    let mut units = 0;
    for (byte, ch) in text.char_indices() {
        if units == offset {
            return Some(byte);
        }
        units += ch.len_utf16();
        if units > offset {
            return None;
        }
    }
    (units == offset).then_some(text.len())
}

/// Byte range covered by a UTF-16 `(offset, length)` pair.
pub fn utf16_range(text: &str, offset: usize, length: usize) -> Option<std::ops::Range<usize>> {
    let start = utf16_to_byte(text, offset)?;
    let end = utf16_to_byte(text, offset.checked_add(length)?)?;
    Some(start..end)
}

/// Substring addressed by a UTF-16 `(offset, length)` pair.
pub fn utf16_slice(text: &str, offset: usize, length: usize) -> Option<&str> {
    utf16_range(text, offset, length).map(|range| &text[range])
}
