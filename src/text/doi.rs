//! DOI pattern extraction over normalized page text.

use regex::Regex;
use std::sync::OnceLock;

static DOI_RE: OnceLock<Regex> = OnceLock::new();

/// Registered DOI form: `10.` + 4-9 digit registrant, `/`, then a suffix
/// running until whitespace, a quote or an angle bracket.
fn doi_re() -> &'static Regex {
    DOI_RE.get_or_init(|| Regex::new(r#"(?i)10\.\d{4,9}/[^\s"<>]+"#).expect("valid DOI regex"))
}

/// Punctuation that ends a sentence rather than a DOI.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':'];

/// All non-overlapping DOI-shaped substrings, in order of appearance.
pub fn find_doi_candidates(text: &str) -> Vec<&str> {
    doi_re().find_iter(text).map(|m| m.as_str()).collect()
}

/// Pick the DOI from normalized text.
///
/// The longest candidate wins; among equally long candidates the first one
/// seen is kept. Trailing `.`, `,`, `;` and `:` are stripped from the winner.
///
/// # Examples
///
/// ```
/// use doi_verify::text::find_doi;
///
/// assert_eq!(
///     find_doi("see 10.1000/abc and 10.1000/abc.def123."),
///     Some("10.1000/abc.def123".to_string())
/// );
/// assert_eq!(find_doi("no identifier here"), None);
/// ```
pub fn find_doi(text: &str) -> Option<String> {
    let best = find_doi_candidates(text)
        .into_iter()
        .reduce(|best, candidate| {
            if candidate.len() > best.len() {
                candidate
            } else {
                best
            }
        })?;

    Some(best.trim_end_matches(TRAILING_PUNCTUATION).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_match_wins() {
        let text = "Cited: 10.1000/abc. This paper: 10.1000/abc.def123 (2021)";
        assert_eq!(find_doi(text), Some("10.1000/abc.def123".to_string()));
    }

    #[test]
    fn test_tie_keeps_first_seen() {
        let text = "10.1000/aaa then 10.2000/bbb";
        assert_eq!(find_doi(text), Some("10.1000/aaa".to_string()));
    }

    #[test]
    fn test_trailing_punctuation_stripped() {
        assert_eq!(find_doi("10.1234/xyz."), Some("10.1234/xyz".to_string()));
        assert_eq!(find_doi("doi:10.1234/xyz;,:"), Some("10.1234/xyz".to_string()));
    }

    #[test]
    fn test_case_insensitive_suffix_preserved() {
        assert_eq!(
            find_doi("DOI 10.1093/NAR/GKAA942"),
            Some("10.1093/NAR/GKAA942".to_string())
        );
    }

    #[test]
    fn test_registrant_digit_bounds() {
        assert_eq!(find_doi("10.123/abc"), None);
        assert_eq!(
            find_doi("10.123456789/abc"),
            Some("10.123456789/abc".to_string())
        );
        assert_eq!(find_doi("10.1234567890/abc"), None);
    }

    #[test]
    fn test_suffix_stops_at_quotes_and_brackets() {
        assert_eq!(
            find_doi(r#"<a href="https://doi.org/10.1145/3372297">link</a>"#),
            Some("10.1145/3372297".to_string())
        );
    }

    #[test]
    fn test_candidates_in_order() {
        let text = "10.1000/first x 10.5555/test.001 y";
        assert_eq!(
            find_doi_candidates(text),
            vec!["10.1000/first", "10.5555/test.001"]
        );
    }

    #[test]
    fn test_no_match() {
        assert_eq!(find_doi(""), None);
        assert_eq!(find_doi("version 10.1 of the software"), None);
    }
}
