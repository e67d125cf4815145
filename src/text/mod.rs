//! Text processing for extracted PDF pages.
//!
//! - [`normalize_page_text`]: canonicalize page text so pattern matching survives
//!   PDF extraction artifacts
//! - [`find_doi`]: pick the best DOI-shaped substring from normalized text
//! - [`truncate_chars`]: cut text to a character budget before it goes into a prompt

mod doi;
mod normalize;

pub use doi::{find_doi, find_doi_candidates};
pub use normalize::normalize_page_text;

/// Truncate `text` to at most `max_chars` characters.
///
/// Counts `char`s rather than bytes so multi-byte text is never split
/// inside a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
