//! Frame tokenizer and section splitter
//!
//! First stage of decoding: split a raw frame on commas, discard framing
//! markers, and group the remaining tokens under single-letter section
//! markers. Total over arbitrary input; there is no error path.

use tracing::trace;

use crate::app::models::{SectionMap, TokenValue};
use crate::constants::{FIELD_DELIMITER, is_framing_marker};

/// Section letter of a token, if the token is a section marker
///
/// A marker is exactly one uppercase ASCII letter. Multi-character tokens
/// (including mode words and numeric strings) are data.
pub fn section_letter(token: &str) -> Option<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_uppercase() => Some(letter),
        _ => None,
    }
}

/// Split a raw frame into its sections
///
/// Framing markers (`*`, `#`) are filtered wherever they appear. Tokens
/// between consecutive commas survive as empty-string data tokens. Tokens
/// seen before the first section marker have no section to land in and are
/// dropped. A repeated section letter keeps only its last occurrence's data.
pub fn split_frame(frame: &str) -> SectionMap {
    let mut sections = SectionMap::new();
    let mut current: Option<(char, Vec<TokenValue>)> = None;

    for token in frame.split(FIELD_DELIMITER) {
        if is_framing_marker(token) {
            continue;
        }

        if let Some(letter) = section_letter(token) {
            // Flush the open section before starting the next one
            if let Some((open_letter, values)) = current.take() {
                sections.insert(open_letter, values);
            }
            current = Some((letter, Vec::new()));
        } else if let Some((_, values)) = current.as_mut() {
            values.push(TokenValue::parse(token));
        } else {
            trace!("Dropped orphan token '{}' before first section marker", token);
        }
    }

    // Flush the trailing section
    if let Some((open_letter, values)) = current {
        sections.insert(open_letter, values);
    }

    sections
}

/// Count the tokens of a frame that belong to no section
///
/// These are the non-marker, non-framing tokens preceding the first section
/// marker; they are the only tokens `split_frame` does not account for.
pub fn orphan_token_count(frame: &str) -> usize {
    frame
        .split(FIELD_DELIMITER)
        .filter(|token| !is_framing_marker(token))
        .take_while(|token| section_letter(token).is_none())
        .count()
}
