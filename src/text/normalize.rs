//! Page text normalization.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();
static HYPHEN_BREAK_RE: OnceLock<Regex> = OnceLock::new();

fn whitespace_re() -> &'static Regex {
    WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

fn hyphen_break_re() -> &'static Regex {
    HYPHEN_BREAK_RE.get_or_init(|| Regex::new(r"(\w+)-\s+(\w+)").expect("valid hyphen regex"))
}

/// Normalize the text extracted from one PDF page.
///
/// Applied in order:
///
/// 1. Unicode NFKD decomposition
/// 2. Drop every non-ASCII character (accents, ligature leftovers, symbols)
/// 3. Newlines become spaces
/// 4. Runs of whitespace collapse to a single space
/// 5. Words split across a line break with a hyphen are rejoined
///    (`"identi- fier"` becomes `"identifier"`)
///
/// Step 5 also merges genuine compound words that happened to wrap at the
/// hyphen. Empty input is returned unchanged.
///
/// # Examples
///
/// ```
/// use doi_verify::text::normalize_page_text;
///
/// assert_eq!(
///     normalize_page_text("Digital Object Identi-\nfier   10.1000/xyz"),
///     "Digital Object Identifier 10.1000/xyz"
/// );
/// ```
pub fn normalize_page_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let ascii: String = raw.nfkd().filter(char::is_ascii).collect();
    let ascii = ascii.replace('\n', " ");
    let collapsed = whitespace_re().replace_all(&ascii, " ");

    rejoin_hyphenated(&collapsed)
}

/// Rejoin hyphenated line-break splits until none remain.
///
/// Repeats because matches never overlap: `"a- b- c"` needs two passes to
/// become `"abc"`.
fn rejoin_hyphenated(text: &str) -> String {
    let mut current = text.to_string();
    while let Cow::Owned(next) = hyphen_break_re().replace_all(&current, "$1$2") {
        current = next;
    }
    current
}
